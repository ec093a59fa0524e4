pub const STRAINLINE_DISPLAY_VERSION: &str = env!("STRAINLINE_DISPLAY_VERSION");
pub const STRAINLINE_BUILD_N: &str = env!("STRAINLINE_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "Strainline {}\nBuild {}\nIncremental cultivar lineage graph engine",
        STRAINLINE_DISPLAY_VERSION, STRAINLINE_BUILD_N
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_text_mentions_build() {
        let text = version_cli_text();
        assert!(text.starts_with("Strainline "));
        assert!(text.contains("Build "));
    }
}
