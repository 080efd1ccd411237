use super::super::fixtures::{array_sum, echo, failures, infinite_loop, two_sum};
use super::*;
use serde_json::json;

const TOOLS: &[&str] = &["python3"];

#[tokio::test]
async fn test_python_echo() -> Result<()> {
    test_language_echo(Language::Python, TOOLS, echo::PYTHON).await
}

#[tokio::test]
async fn test_python_two_sum() -> Result<()> {
    test_language_two_sum(Language::Python, TOOLS, two_sum::PYTHON).await
}

#[tokio::test]
async fn test_python_timeout() -> Result<()> {
    test_language_timeout(Language::Python, TOOLS, infinite_loop::PYTHON).await
}

#[tokio::test]
async fn test_python_no_entry() -> Result<()> {
    test_language_no_entry(Language::Python, TOOLS, "x = 1\n").await
}

#[tokio::test]
async fn test_python_list_input_with_length_prefix() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let input = TestInput::List(vec![json!(3), json!("1 2 3")]);
    let result = service
        .execute(array_sum::PYTHON, "python", Some(input))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "6");
    Ok(())
}

#[tokio::test]
async fn test_python_runtime_error_reports_stderr() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service
        .execute(failures::PYTHON_RAISES, "python", Some(TestInput::from("x")))
        .await;
    assert!(result.is_error);
    assert!(result.error.contains("ValueError: boom"));
    assert_eq!(result.output, "");
    assert_scratch_empty(&service);
    Ok(())
}

#[tokio::test]
async fn test_python_renders_values() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let cases = [
        ("def solve():\n    return None\n", "null"),
        ("def solve():\n    return True\n", "true"),
        ("def solve():\n    return {'a': [1, 2]}\n", r#"{"a":[1,2]}"#),
        ("def solve():\n    return (1, 'x')\n", r#"[1,"x"]"#),
    ];
    for (code, expected) in cases {
        let result = service.execute(code, "python", None).await;
        assert!(!result.is_error, "unexpected error: {}", result.error);
        assert_eq!(result.output, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_python_stderr_flood_is_bounded() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let code = "import sys\n\ndef solve():\n    block = 'x' * (1 << 20)\n    while True:\n        sys.stderr.write(block)\n";
    let result = service.execute(code, "python", None).await;
    assert_timed_out(&result);
    assert_scratch_empty(&service);
    Ok(())
}
