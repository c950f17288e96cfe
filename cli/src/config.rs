use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use listing_client::CurrentUser;
use tempfile::NamedTempFile;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;
use toml_edit::value;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Values read from `config.toml`. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSettings {
    pub api_base_url: Option<String>,
    pub dashboard_url: Option<String>,
    pub user: Option<CurrentUser>,
}

impl ListingSettings {
    /// `--api-base-url` beats the config file, which beats the built-in default.
    pub fn resolve_api_base_url(&self, cli_override: Option<&str>) -> String {
        cli_override
            .or(self.api_base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn resolve_dashboard_url(&self, api_base_url: &str) -> String {
        self.dashboard_url
            .clone()
            .unwrap_or_else(|| format!("{}/dashboard", api_base_url.trim_end_matches('/')))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<ListingSettings> {
        let Some(doc) = self.read_document()? else {
            return Ok(ListingSettings::default());
        };

        let user = read_string(doc.as_table(), "session", "user").map(|name| {
            CurrentUser::new(name, read_string(doc.as_table(), "session", "token"))
        });

        Ok(ListingSettings {
            api_base_url: read_top_level_string(&doc, "api_base_url"),
            dashboard_url: read_top_level_string(&doc, "dashboard_url"),
            user,
        })
    }

    /// Store the signed-in user, keeping the rest of the file (comments included) intact.
    pub fn set_session(&self, user: &str, token: &str) -> anyhow::Result<()> {
        let mut doc = self.read_document()?.unwrap_or_default();
        let session = ensure_table_for_write(&mut doc, "session");
        session["user"] = value(user);
        session["token"] = value(token);
        write_atomic_text(&self.path, &doc.to_string())
    }

    /// Forget the signed-in user. A missing file is already signed out.
    pub fn clear_session(&self) -> anyhow::Result<()> {
        let Some(mut doc) = self.read_document()? else {
            return Ok(());
        };
        if doc.remove("session").is_none() {
            return Ok(());
        }
        write_atomic_text(&self.path, &doc.to_string())
    }

    fn read_document(&self) -> anyhow::Result<Option<DocumentMut>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("read {}", self.path.display())));
            }
        };
        let doc = contents
            .parse::<DocumentMut>()
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(doc))
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".listing").join("config.toml")
}

fn read_top_level_string(doc: &DocumentMut, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(TomlItem::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn read_string(root: &TomlTable, table: &str, key: &str) -> Option<String> {
    root.get(table)
        .and_then(TomlItem::as_table)
        .and_then(|table| table.get(key))
        .and_then(TomlItem::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn ensure_table_for_write<'a>(doc: &'a mut DocumentMut, key: &str) -> &'a mut TomlTable {
    if doc.get(key).and_then(TomlItem::as_table).is_none() {
        let mut table = TomlTable::new();
        table.set_implicit(false);
        doc[key] = TomlItem::Table(table);
    }
    match &mut doc[key] {
        TomlItem::Table(table) => table,
        _ => unreachable!("expected `{key}` to be a table"),
    }
}

fn write_atomic_text(path: &Path, contents: &str) -> anyhow::Result<()> {
    let Some(parent) = path.parent() else {
        anyhow::bail!("invalid path for atomic write: {}", path.display());
    };
    std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent).context("create temp file")?;
    use std::io::Write as _;
    tmp.write_all(contents.as_bytes())
        .context("write temp file")?;
    if !contents.ends_with('\n') {
        tmp.write_all(b"\n").context("write temp newline")?;
    }
    tmp.flush().context("flush temp file")?;

    tmp.persist(path).map_err(|err| {
        anyhow::Error::new(err.error).context(format!("persist file to {}", path.display()))
    })?;

    Ok(())
}
