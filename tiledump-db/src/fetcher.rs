use std::fmt;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::error::{PersistError, RunError, StoreError};
use crate::model::Document;
use crate::repository::DocumentStore;

/// Result of a single lookup. Callers must match on it before persisting.
#[derive(Debug)]
pub enum FetchOutcome {
    Found(Document),
    NotFound,
    Failed(StoreError),
}

impl From<Result<Option<Document>, StoreError>> for FetchOutcome {
    fn from(result: Result<Option<Document>, StoreError>) -> Self {
        match result {
            Ok(Some(document)) => FetchOutcome::Found(document),
            Ok(None) => FetchOutcome::NotFound,
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

/// What a run does with an id that has no record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissPolicy {
    /// Log, remember the id and move on.
    #[default]
    Skip,
    /// Abort the run.
    Fail,
}

impl FromStr for MissPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(MissPolicy::Skip),
            "fail" => Ok(MissPolicy::Fail),
            other => Err(format!("unknown miss policy '{other}', expected 'skip' or 'fail'")),
        }
    }
}

impl fmt::Display for MissPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissPolicy::Skip => f.write_str("skip"),
            MissPolicy::Fail => f.write_str("fail"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Written files, in processing order.
    pub written: Vec<PathBuf>,
    /// Ids (or paths) that had no record.
    pub missing: Vec<String>,
}

/// Looks documents up in a store and writes their payloads under a debug root.
pub struct DocumentFetcher<'a, S> {
    store: &'a S,
    debug_root: PathBuf,
    miss_policy: MissPolicy,
}

impl<'a, S: DocumentStore> DocumentFetcher<'a, S> {
    pub fn new(store: &'a S, debug_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            debug_root: debug_root.into(),
            miss_policy: MissPolicy::default(),
        }
    }

    pub fn with_miss_policy(mut self, miss_policy: MissPolicy) -> Self {
        self.miss_policy = miss_policy;
        self
    }

    pub fn debug_root(&self) -> &Path {
        &self.debug_root
    }

    pub async fn fetch(&self, id: &str) -> FetchOutcome {
        if id.is_empty() {
            warn!("Skipping lookup of an empty id");
            return FetchOutcome::NotFound;
        }
        debug!("Looking up '{id}'");
        self.store.find_by_id(id).await.into()
    }

    pub async fn fetch_by_path(&self, local_path: &str, file_name: &str) -> FetchOutcome {
        if file_name.is_empty() {
            warn!("Skipping lookup with an empty file name");
            return FetchOutcome::NotFound;
        }
        debug!("Looking up '{local_path}/{file_name}'");
        self.store.find_by_path(local_path, file_name).await.into()
    }

    /// `<debug_root>/<local_path>/<file_name>` for `document`.
    ///
    /// Leading separators in `local_path` are dropped so the result always stays
    /// under the debug root.
    pub fn destination(&self, document: &Document) -> Result<PathBuf, PersistError> {
        let precondition = |reason| PersistError::Precondition {
            id: document.id.clone(),
            reason,
        };

        let file_name = document.file_name.as_str();
        if file_name.is_empty() {
            return Err(precondition("file name is empty"));
        }
        if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
            return Err(precondition("file name is not a single path segment"));
        }

        let mut path = self.debug_root.clone();
        for component in Path::new(&document.local_path).components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(precondition("local path escapes the debug root"));
                }
                Component::Prefix(_) => {
                    return Err(precondition("local path carries a drive prefix"));
                }
            }
        }
        path.push(file_name);
        Ok(path)
    }

    /// Writes the document's content to its destination, creating missing
    /// directories and overwriting any existing file. Returns the written path.
    pub async fn persist(&self, document: &Document) -> Result<PathBuf, PersistError> {
        let path = self.destination(document)?;

        if let Some(dir) = path.parent() {
            if ensure_dir(dir).await? {
                info!("Path created: {}", dir.display());
            }
        }

        tokio::fs::write(&path, &document.content)
            .await
            .map_err(|source| PersistError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", document.content.len(), path.display());
        Ok(path)
    }

    /// Fetches and persists every id in order. A store or filesystem failure
    /// stops the run; misses follow the configured [`MissPolicy`].
    pub async fn run<I>(&self, ids: I, progress: &ProgressBar) -> Result<RunSummary, RunError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut summary = RunSummary::default();

        for id in ids {
            let id = id.as_ref();
            let outcome = self.fetch(id).await;
            self.handle(id, outcome, &mut summary, progress).await?;
        }

        info!(
            "Processed {} documents, {} missing.",
            summary.written.len(),
            summary.missing.len()
        );
        Ok(summary)
    }

    /// Single lookup by `(local_path, file_name)`, handled like one id of [`run`](Self::run).
    pub async fn run_path(
        &self,
        local_path: &str,
        file_name: &str,
        progress: &ProgressBar,
    ) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();
        let key = format!("{local_path}/{file_name}");
        let outcome = self.fetch_by_path(local_path, file_name).await;
        self.handle(&key, outcome, &mut summary, progress).await?;
        Ok(summary)
    }

    async fn handle(
        &self,
        key: &str,
        outcome: FetchOutcome,
        summary: &mut RunSummary,
        progress: &ProgressBar,
    ) -> Result<(), RunError> {
        progress.inc(1);

        match outcome {
            FetchOutcome::Found(document) => {
                let path = self.persist(&document).await?;
                progress.suspend(|| report_path(&mut io::stdout().lock(), &path))?;
                summary.written.push(path);
            }
            FetchOutcome::NotFound => match self.miss_policy {
                MissPolicy::Skip => {
                    warn!("No document found for '{key}', skipping");
                    summary.missing.push(key.to_string());
                }
                MissPolicy::Fail => return Err(RunError::NotFound(key.to_string())),
            },
            FetchOutcome::Failed(source) => {
                return Err(RunError::Store {
                    key: key.to_string(),
                    source,
                });
            }
        }

        Ok(())
    }
}

/// Creates `dir` and its parents. Returns whether anything had to be created.
async fn ensure_dir(dir: &Path) -> Result<bool, PersistError> {
    let existed = tokio::fs::try_exists(dir).await.unwrap_or(false);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PersistError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    Ok(!existed)
}

/// Writes `path` on its own line. A reader that went away (`| head`) stops
/// seeing paths but the run carries on writing files.
fn report_path(out: &mut impl Write, path: &Path) -> Result<(), RunError> {
    match writeln!(out, "{}", path.display()) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(RunError::Report(e)),
        _ => Ok(()),
    }
}
