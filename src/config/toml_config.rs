use crate::core::ConfigProvider;
use crate::utils::error::{FunnelError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File-based configuration for the API ingestion path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub endpoints: EndpointsConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub leads: String,
    pub test_drives: String,
    pub journeys: String,
    pub billed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FunnelError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FunnelError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values, leaving
    /// unresolvable placeholders untouched.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl ConfigProvider for TomlConfig {
    fn leads_endpoint(&self) -> &str {
        &self.endpoints.leads
    }

    fn test_drives_endpoint(&self) -> &str {
        &self.endpoints.test_drives
    }

    fn journeys_endpoint(&self) -> &str {
        &self.endpoints.journeys
    }

    fn billed_endpoint(&self) -> &str {
        &self.endpoints.billed
    }

    fn output_path(&self) -> &str {
        self.output.as_ref().map(|o| o.path.as_str()).unwrap_or("./output")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoints.leads", &self.endpoints.leads)?;
        validation::validate_url("endpoints.test_drives", &self.endpoints.test_drives)?;
        validation::validate_url("endpoints.journeys", &self.endpoints.journeys)?;
        validation::validate_url("endpoints.billed", &self.endpoints.billed)?;
        if let Some(output) = &self.output {
            validation::validate_path("output.path", &output.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[endpoints]
leads = "https://api.example.com/data?tipo=leads"
test_drives = "https://api.example.com/data?tipo=testdrive"
journeys = "https://api.example.com/data?tipo=geral"
billed = "https://api.example.com/data?tipo=faturados"

[output]
path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.leads_endpoint(),
            "https://api.example.com/data?tipo=leads"
        );
        assert_eq!(config.output_path(), "./reports");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_section_optional() {
        let toml_content = r#"
[endpoints]
leads = "https://api.example.com/leads"
test_drives = "https://api.example.com/testdrive"
journeys = "https://api.example.com/geral"
billed = "https://api.example.com/faturados"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "./output");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FUNNEL_TEST_API_BASE", "https://test.api.com");

        let toml_content = r#"
[endpoints]
leads = "${FUNNEL_TEST_API_BASE}/leads"
test_drives = "${FUNNEL_TEST_API_BASE}/testdrive"
journeys = "${FUNNEL_TEST_API_BASE}/geral"
billed = "${FUNNEL_TEST_API_BASE}/faturados"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoints.leads, "https://test.api.com/leads");

        std::env::remove_var("FUNNEL_TEST_API_BASE");
    }

    #[test]
    fn test_config_validation_rejects_bad_url() {
        let toml_content = r#"
[endpoints]
leads = "invalid-url"
test_drives = "https://api.example.com/testdrive"
journeys = "https://api.example.com/geral"
billed = "https://api.example.com/faturados"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[endpoints]
leads = "https://api.example.com/leads"
test_drives = "https://api.example.com/testdrive"
journeys = "https://api.example.com/geral"
billed = "https://api.example.com/faturados"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoints.leads, "https://api.example.com/leads");
    }
}
