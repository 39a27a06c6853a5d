use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("admin_console_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("console.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings =
        load_settings_from(Path::new("/nonexistent/console.toml"), |_| None).expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.employee_api_url.as_str(), DEFAULT_EMPLOYEE_API_URL);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config("employee_api_url = \"http://10.0.0.5:3001/api/employees\"\n");
    let settings = load_settings_from(&path, |_| None).expect("settings");
    assert_eq!(
        settings.employee_api_url.as_str(),
        "http://10.0.0.5:3001/api/employees"
    );
    assert_eq!(settings.demo_api_url.as_str(), "https://jsonplaceholder.typicode.com/");
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn prefixed_env_wins_over_bare_env_and_file() {
    let path = temp_config("employee_api_url = \"http://file.example/api/employees\"\n");
    let settings = load_settings_from(&path, |key| match key {
        "EMPLOYEE_API_URL" => Some("http://bare.example/api/employees".into()),
        "APP__EMPLOYEE_API_URL" => Some("http://prefixed.example/api/employees".into()),
        "DEMO_API_URL" => Some("http://demo.example".into()),
        _ => None,
    })
    .expect("settings");
    assert_eq!(
        settings.employee_api_url.as_str(),
        "http://prefixed.example/api/employees"
    );
    assert_eq!(settings.demo_api_url.host_str(), Some("demo.example"));
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_file_is_ignored() {
    let path = temp_config("this is = = not toml");
    let settings = load_settings_from(&path, |_| None).expect("settings");
    assert_eq!(settings, Settings::default());
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn invalid_override_is_reported() {
    let err = load_settings_from(Path::new("/nonexistent/console.toml"), |key| {
        (key == "EMPLOYEE_API_URL").then(|| "not a url".to_string())
    })
    .expect_err("invalid url");
    assert!(err.to_string().contains("EMPLOYEE_API_URL"));

    let err = load_settings_from(Path::new("/nonexistent/console.toml"), |key| {
        (key == "DEMO_API_URL").then(|| "ftp://demo.example".to_string())
    })
    .expect_err("unsupported scheme");
    assert!(err.to_string().contains("http or https"));
}
