//! # I18n Unit Tests / 国际化单元测试
//!
//! Tests locale resolution and that both bundled languages translate messages.
//!
//! 测试语言环境解析以及两种内置语言均可翻译消息。

use build_matrix::config::BuildMatrix;
use build_matrix::models::{AxisValue, BuildResult, VariantCombination};
use build_matrix::{resolve_locale, set_language};

const EMPTY_AXIS: &str = r#"
command = "make"

[[axes]]
name = "python"
values = []
"#;

fn skipped() -> BuildResult {
    BuildResult::Skipped {
        combination: VariantCombination::new(vec![AxisValue {
            axis: "python".to_string(),
            value: "3.10".to_string(),
        }]),
    }
}

#[test]
fn test_resolve_locale() {
    assert_eq!(resolve_locale("en"), "en");
    assert_eq!(resolve_locale("zh-CN"), "zh-CN");
    assert_eq!(resolve_locale("en-US"), "en");
    assert_eq!(resolve_locale("en_GB"), "en");
    assert_eq!(resolve_locale("fr-FR"), "en");
    assert_eq!(resolve_locale(""), "en");
}

// Locale is process-global, so all switching happens in one test.
#[test]
fn test_messages_follow_the_selected_language() {
    set_language("zh-CN");
    assert_eq!(skipped().status_str(), "跳过");
    let err = BuildMatrix::from_toml_str(EMPTY_AXIS).unwrap_err();
    assert_eq!(err.to_string(), "轴 'python' 没有任何值");

    set_language("en-US");
    assert_eq!(skipped().status_str(), "Skipped");
    let err = BuildMatrix::from_toml_str(EMPTY_AXIS).unwrap_err();
    assert_eq!(err.to_string(), "Axis 'python' has no values");
}
