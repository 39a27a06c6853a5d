use super::*;

#[test]
fn compose_email_requires_both_halves() {
    assert_eq!(compose_email("kim", "example.com"), "kim@example.com");
    assert_eq!(compose_email(" kim ", " example.com "), "kim@example.com");
    assert_eq!(compose_email("kim", ""), "");
    assert_eq!(compose_email("", "example.com"), "");
}

#[test]
fn email_shape_check() {
    assert!(is_valid_email("kim@example.com"));
    assert!(!is_valid_email("kim@example"));
    assert!(!is_valid_email("kim example@x.com"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("kim@@example.com"));
    assert!(!is_valid_email("kim@.com"));
}

#[test]
fn email_dots_after_the_domain_split_are_accepted() {
    for candidate in ["a@b.c.", "a@b..", "kim@corp.example."] {
        assert!(is_valid_email(candidate), "rejected {candidate}");
    }
    assert!(!is_valid_email("a@b."));
}

#[test]
fn phone_parts_keep_digits_and_respect_prefix_length() {
    assert_eq!(sanitize_phone_part("010", PhonePart::Middle, "12a34-56"), "1234");
    assert_eq!(sanitize_phone_part("02", PhonePart::Middle, "12345"), "123");
    assert_eq!(sanitize_phone_part("02", PhonePart::Last, "987654"), "9876");
}

#[test]
fn blank_search_query_is_rejected() {
    assert_eq!(validate_search_query("   "), Err(ValidationError::EmptyQuery));
    assert_eq!(validate_search_query("  Lee ").as_deref(), Ok("Lee"));
}

#[test]
fn changing_prefix_clears_typed_digits() {
    let mut draft = EmployeeDraft::default();
    draft.set_phone_part(PhonePart::Middle, "1234");
    draft.set_phone_part(PhonePart::Last, "5678");
    draft.set_phone_prefix("031");
    assert!(draft.phone_middle.is_empty());
    assert!(draft.phone_last.is_empty());

    draft.set_phone_part(PhonePart::Middle, "1234");
    assert_eq!(draft.phone_middle, "123");
}

#[test]
fn draft_requires_business_key_and_name() {
    let draft = EmployeeDraft {
        name: "Kim".into(),
        ..EmployeeDraft::default()
    };
    assert_eq!(
        draft.into_input(),
        Err(ValidationError::MissingField("employeeId"))
    );

    let draft = EmployeeDraft {
        employee_id: "EMP-1".into(),
        ..EmployeeDraft::default()
    };
    assert_eq!(draft.into_input(), Err(ValidationError::MissingField("name")));
}

#[test]
fn draft_rejects_malformed_email() {
    let draft = EmployeeDraft {
        employee_id: "EMP-1".into(),
        name: "Kim".into(),
        email_local: "kim".into(),
        email_domain: "localhost".into(),
        ..EmployeeDraft::default()
    };
    assert!(matches!(
        draft.into_input(),
        Err(ValidationError::InvalidEmail(email)) if email == "kim@localhost"
    ));
}

#[test]
fn draft_builds_trimmed_input() {
    let draft = EmployeeDraft {
        employee_id: " EMP-7 ".into(),
        name: "Park".into(),
        email_local: "park".into(),
        department: "HR".into(),
        phone_middle: "1234".into(),
        phone_last: "5678".into(),
        ..EmployeeDraft::default()
    };
    let input = draft.into_input().expect("valid draft");
    assert_eq!(input.employee_id, "EMP-7");
    assert_eq!(input.email.as_deref(), Some("park@naver.com"));
    assert_eq!(input.department.as_deref(), Some("HR"));
    assert_eq!(input.phone_prefix.as_deref(), Some("010"));
    assert_eq!(input.phone_middle.as_deref(), Some("1234"));
    assert!(input.position.is_none());
    assert!(input.zip_code.is_none());
}

#[test]
fn draft_without_email_or_phone_omits_their_parts() {
    let draft = EmployeeDraft {
        employee_id: "EMP-8".into(),
        name: "Choi".into(),
        ..EmployeeDraft::default()
    };
    let input = draft.into_input().expect("valid draft");
    assert!(input.email.is_none());
    assert!(input.email_domain.is_none());
    assert!(input.phone_prefix.is_none());
}
