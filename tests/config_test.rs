mod common;

use common::AdminctlTest;

#[test]
fn test_config_show_defaults() {
    let test = AdminctlTest::new();
    let output = test.run_json(&["config", "show", "--json"]);

    assert_eq!(output["values"]["api.base_url"], "http://localhost:8080");
    assert_eq!(output["values"]["api.token"], serde_json::Value::Null);
    assert_eq!(output["values"]["query.page_size"], 10);
    assert_eq!(output["values"]["query.use_cache"], true);
    assert_eq!(output["identity_configured"], false);
}

#[test]
fn test_config_set_and_get() {
    let test = AdminctlTest::new();

    let stdout = test.run_success(&["config", "set", "query.page_size", "25"]);
    assert!(stdout.contains("query.page_size"));
    assert!(test.read_config().contains("page_size: 25"));

    let output = test.run_json(&["config", "get", "query.page_size", "--json"]);
    assert_eq!(output["value"], 25);
    assert_eq!(output["configured"], true);
}

#[test]
fn test_config_set_base_url_trims_slash() {
    let test = AdminctlTest::new();
    test.run_success(&["config", "set", "api.base_url", "https://admin.example.test/"]);

    let stdout = test.run_success(&["config", "get", "api.base_url"]);
    assert_eq!(stdout.trim(), "https://admin.example.test");
}

#[test]
fn test_config_token_is_masked() {
    let test = AdminctlTest::new();
    test.run_success(&["config", "set", "api.token", "secret-token-value"]);

    let output = test.run_json(&["config", "get", "api.token", "--json"]);
    assert_eq!(output["value"], "se...ue");
    assert_eq!(output["masked"], true);

    let shown = test.run_success(&["config", "show"]);
    assert!(!shown.contains("secret-token-value"));
}

#[test]
fn test_config_rejects_invalid_values() {
    let test = AdminctlTest::new();

    let stderr = test.run_failure(&["config", "set", "query.page_size", "0"]);
    assert!(stderr.contains("positive integer"));

    let stderr = test.run_failure(&["config", "set", "api.base_url", "ftp://example.test"]);
    assert!(stderr.contains("http(s)"));

    let stderr = test.run_failure(&["config", "set", "query.use_cache", "maybe"]);
    assert!(stderr.contains("query.use_cache"));
}

#[test]
fn test_config_unknown_key() {
    let test = AdminctlTest::new();
    let stderr = test.run_failure(&["config", "get", "api.password"]);
    assert!(stderr.contains("unknown config key 'api.password'"));
    assert!(stderr.contains("api.base_url"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let test = AdminctlTest::new();
    test.write_config("query:\n  page_size: 0\n");
    let stderr = test.run_failure(&["config", "show"]);
    assert!(stderr.contains("page_size"));
}
