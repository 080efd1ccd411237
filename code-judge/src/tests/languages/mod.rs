use super::utils::{
    assertions::{assert_scratch_empty, assert_timed_out},
    defaults::test_service,
};
use crate::{languages::skip_if_not_available, Language, Result, TestInput};

pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

// Common test utilities for language tests

/// The harness must hand back exactly what `solve` returned, never the
/// program's own prints.
pub(crate) async fn test_language_echo(
    language: Language,
    tools: &[&str],
    code: &str,
) -> Result<()> {
    if skip_if_not_available(tools) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service
        .execute(code, language.as_str(), Some(TestInput::from("hello world")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "hello world");
    assert_scratch_empty(&service);
    Ok(())
}

pub(crate) async fn test_language_two_sum(
    language: Language,
    tools: &[&str],
    code: &str,
) -> Result<()> {
    if skip_if_not_available(tools) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service
        .execute(code, language.as_str(), Some(TestInput::from("4\n2 7 11 15\n9")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "[0,1]");
    Ok(())
}

pub(crate) async fn test_language_timeout(
    language: Language,
    tools: &[&str],
    code: &str,
) -> Result<()> {
    if skip_if_not_available(tools) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service.execute(code, language.as_str(), None).await;
    assert_timed_out(&result);
    assert_eq!(result.output, "");
    assert_scratch_empty(&service);
    Ok(())
}

pub(crate) async fn test_language_no_entry(
    language: Language,
    tools: &[&str],
    code: &str,
) -> Result<()> {
    if skip_if_not_available(tools) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service.execute(code, language.as_str(), None).await;
    assert!(result.is_error);
    assert!(result.output.contains("no usable solve() entry point"));
    Ok(())
}
