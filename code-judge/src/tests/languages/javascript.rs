use super::super::fixtures::{array_sum, echo, infinite_loop, two_sum};
use super::*;

const TOOLS: &[&str] = &["node"];

#[tokio::test]
async fn test_javascript_echo() -> Result<()> {
    test_language_echo(Language::JavaScript, TOOLS, echo::JAVASCRIPT).await
}

#[tokio::test]
async fn test_javascript_two_sum() -> Result<()> {
    test_language_two_sum(Language::JavaScript, TOOLS, two_sum::JAVASCRIPT).await
}

#[tokio::test]
async fn test_javascript_timeout() -> Result<()> {
    test_language_timeout(Language::JavaScript, TOOLS, infinite_loop::JAVASCRIPT).await
}

#[tokio::test]
async fn test_javascript_no_entry() -> Result<()> {
    test_language_no_entry(Language::JavaScript, TOOLS, "const answer = 42;\n").await
}

#[tokio::test]
async fn test_javascript_array_without_prefix() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    // 5 is not a length prefix for three values, so every token is data
    let result = service
        .execute(array_sum::JAVASCRIPT, "js", Some(TestInput::from("5 1 2 3")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "11");
    Ok(())
}

#[tokio::test]
async fn test_javascript_undefined_renders_as_null() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service
        .execute("function solve() {}\n", "javascript", None)
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "null");
    Ok(())
}

#[tokio::test]
async fn test_javascript_deferred_and_raw_writes_are_suppressed() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let deferred = "function solve(s) {\n  setTimeout(() => console.log('LEAK'), 0);\n  Promise.resolve().then(() => process.stdout.write('LEAK'));\n  return s;\n}\n";
    let result = service
        .execute(deferred, "javascript", Some(TestInput::from("hello")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "hello");

    let raw = "function solve(s) {\n  require('fs').writeSync(1, 'RAW');\n  return s;\n}\n";
    let result = service
        .execute(raw, "javascript", Some(TestInput::from("hello")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "hello");
    Ok(())
}

#[tokio::test]
async fn test_javascript_pending_timers_do_not_delay_result() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let code = "async function solve(s) {\n  setInterval(() => console.log('tick'), 10);\n  return s.length;\n}\n";
    let result = service
        .execute(code, "javascript", Some(TestInput::from("abcd")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "4");
    assert!(result.execution_time_ms < 5000);
    Ok(())
}
