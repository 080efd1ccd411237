use super::super::fixtures::{echo, failures, infinite_loop, two_sum};
use super::*;
use crate::COMPILE_ERROR_PREFIX;

const TOOLS: &[&str] = &["javac", "java"];

#[tokio::test]
async fn test_java_echo() -> Result<()> {
    test_language_echo(Language::Java, TOOLS, echo::JAVA).await
}

#[tokio::test]
async fn test_java_two_sum() -> Result<()> {
    test_language_two_sum(Language::Java, TOOLS, two_sum::JAVA).await
}

#[tokio::test]
async fn test_java_timeout() -> Result<()> {
    test_language_timeout(Language::Java, TOOLS, infinite_loop::JAVA).await
}

#[tokio::test]
async fn test_java_compile_error() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let result = service
        .execute(failures::JAVA_SYNTAX_ERROR, "java", None)
        .await;
    assert!(result.is_error);
    assert!(result.error.starts_with(COMPILE_ERROR_PREFIX));
    assert_eq!(result.execution_time_ms, 0);
    assert_scratch_empty(&service);
    Ok(())
}

#[tokio::test]
async fn test_java_solve_outside_solution_has_no_entry() -> Result<()> {
    let code = "class Foo {\n    int solve() {\n        return 1;\n    }\n}\n";
    test_language_no_entry(Language::Java, TOOLS, code).await
}

#[tokio::test]
async fn test_java_direct_descriptor_writes_are_suppressed() -> Result<()> {
    if skip_if_not_available(TOOLS) {
        return Ok(());
    }
    let (_root, service) = test_service(1).await?;

    let code = r#"import java.io.FileDescriptor;
import java.io.FileOutputStream;

class Solution {
    public String solve(String s) throws Exception {
        System.out.println("noise");
        new FileOutputStream(FileDescriptor.out).write("RAW".getBytes());
        return s;
    }
}
"#;
    let result = service
        .execute(code, "java", Some(TestInput::from("hello")))
        .await;
    assert!(!result.is_error, "unexpected error: {}", result.error);
    assert_eq!(result.output, "hello");
    Ok(())
}
