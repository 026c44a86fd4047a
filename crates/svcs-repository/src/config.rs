//! INI-style repository configuration (`.svcs/config`).
//!
//! Supports plain sections (`[core]`) and subsectioned ones
//! (`[remote "origin"]`). Values are `key = value` lines; `#` and `;`
//! start comments. The config is data only — no transport lives here.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::RepoError;

/// A parsed section: `[name]` or `[name "subsection"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    subsection: Option<String>,
    entries: Vec<(String, String)>,
}

/// Parsed repository configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    sections: Vec<Section>,
    path: Option<PathBuf>,
}

impl Config {
    /// Load from a file. A missing file yields an empty config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let bytes = match svcs_utils::fs::read_file(path) {
            Ok(b) => b,
            Err(svcs_utils::UtilError::NotFound(_)) => {
                return Ok(Self {
                    sections: Vec::new(),
                    path: Some(path.to_path_buf()),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8_lossy(&bytes);
        let mut config = Self::parse(&text)?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text.
    pub fn parse(text: &str) -> Result<Self, RepoError> {
        let mut sections: Vec<Section> = Vec::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let header = header
                    .strip_suffix(']')
                    .ok_or_else(|| RepoError::ConfigParse {
                        line: lineno + 1,
                        reason: "unterminated section header".into(),
                    })?
                    .trim();

                let (name, subsection) = match header.split_once(' ') {
                    Some((name, rest)) => {
                        let rest = rest.trim();
                        let sub = rest
                            .strip_prefix('"')
                            .and_then(|r| r.strip_suffix('"'))
                            .ok_or_else(|| RepoError::ConfigParse {
                                line: lineno + 1,
                                reason: "subsection must be quoted".into(),
                            })?;
                        (name.to_string(), Some(sub.to_string()))
                    }
                    None => (header.to_string(), None),
                };

                sections.push(Section {
                    name: name.to_ascii_lowercase(),
                    subsection,
                    entries: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(RepoError::ConfigParse {
                    line: lineno + 1,
                    reason: format!("expected 'key = value', got '{line}'"),
                });
            };
            let Some(section) = sections.last_mut() else {
                return Err(RepoError::ConfigParse {
                    line: lineno + 1,
                    reason: "entry before any section header".into(),
                });
            };
            section.entries.push((
                key.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            ));
        }

        Ok(Self {
            sections,
            path: None,
        })
    }

    /// Look up a value by section / optional subsection / key.
    /// The last definition wins.
    pub fn get(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&str> {
        let section = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();
        self.sections
            .iter()
            .filter(|s| s.name == section && s.subsection.as_deref() == subsection)
            .flat_map(|s| s.entries.iter())
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .next_back()
    }

    /// Set a value, creating the section if needed.
    pub fn set(&mut self, section: &str, subsection: Option<&str>, key: &str, value: &str) {
        let name = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();

        let section = self
            .sections
            .iter_mut()
            .find(|s| s.name == name && s.subsection.as_deref() == subsection);

        let section = match section {
            Some(s) => s,
            None => {
                self.sections.push(Section {
                    name,
                    subsection: subsection.map(str::to_string),
                    entries: Vec::new(),
                });
                self.sections.last_mut().unwrap()
            }
        };

        if let Some(entry) = section.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value.to_string();
        } else {
            section.entries.push((key, value.to_string()));
        }
    }

    /// The URL of a configured remote, if any.
    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.get("remote", Some(name), "url")
    }

    /// Names of all configured remotes.
    pub fn remote_names(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.name == "remote")
            .filter_map(|s| s.subsection.as_deref())
            .collect()
    }

    /// Serialize back to config text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match &section.subsection {
                Some(sub) => {
                    let _ = writeln!(out, "[{} \"{}\"]", section.name, sub);
                }
                None => {
                    let _ = writeln!(out, "[{}]", section.name);
                }
            }
            for (key, value) in &section.entries {
                let _ = writeln!(out, "\t{key} = {value}");
            }
        }
        out
    }

    /// Write back to the file this config was loaded from.
    pub fn save(&self) -> Result<(), RepoError> {
        if let Some(ref path) = self.path {
            std::fs::write(path, self.to_text())?;
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(['#', ';']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}
