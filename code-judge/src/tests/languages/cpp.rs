use super::super::fixtures::{echo, failures, infinite_loop, two_sum};
use super::*;
use crate::COMPILE_ERROR_PREFIX;

const TOOLS: &[&str] = &["g++"];

#[tokio::test]
async fn test_cpp_echo() -> Result<()> {
    test_language_echo(Language::Cpp, TOOLS, echo::CPP).await
}

#[tokio::test]
async fn test_cpp_two_sum() -> Result<()> {
    test_language_two_sum(Language::Cpp, TOOLS, two_sum::CPP).await
}

#[tokio::test]
async fn test_cpp_timeout() -> Result<()> {
    test_language_timeout(Language::Cpp, TOOLS, infinite_loop::CPP).await
}

#[tokio::test]
async fn test_cpp_compile_error_never_runs() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service.execute(failures::CPP_SYNTAX_ERROR, "cpp", None).await;
    assert!(result.is_error);
    assert!(result.error.starts_with(COMPILE_ERROR_PREFIX));
    assert!(result.error.contains("error"));
    assert_eq!(result.output, "");
    assert_eq!(result.execution_time_ms, 0);
    Ok(())
}

#[tokio::test]
async fn test_cpp_compilations_are_isolated() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(2).await?;

    let broken = service.execute(failures::CPP_SYNTAX_ERROR, "cpp", None);
    let working = service.execute(echo::CPP, "cpp", Some(TestInput::from("isolated")));
    let (broken, working) = tokio::join!(broken, working);

    assert!(broken.error.starts_with(COMPILE_ERROR_PREFIX));
    assert!(!working.is_error, "unexpected error: {}", working.error);
    assert_eq!(working.output, "isolated");
    assert_scratch_empty(&service);
    Ok(())
}

#[tokio::test]
async fn test_cpp_self_contained_program() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service
        .execute(failures::CPP_SELF_CONTAINED, "c++", Some(TestInput::from("abc")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "got:abc");
    Ok(())
}
