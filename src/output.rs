use std::path::Path;
use anyhow::{Context, Result};
use futures::future;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use graphql_freeze_compiler::{Artifact, CompileOptions};

const EMBEDDED_HASH_PREFIX: &str = "// hash:";
const INDEX_FILE_NAME: &str = "index.ts";

/// Writes the generated artifacts and, once, the hand-editable `index.ts`.
pub async fn write_files(artifacts: &[Artifact], output_directory: &Path, options: &CompileOptions) -> Result<()> {
    let exists = fs::try_exists(output_directory)
        .await
        .with_context(|| format!("Unable to access output directory {}", output_directory.display()))?;
    if !exists {
        fs::create_dir(output_directory).await.with_context(|| {
            format!(
                "Unable to create output directory {}, does the parent folder exist?",
                output_directory.display()
            )
        })?;
    }

    let create_index_task = async {
        let path = output_directory.join(INDEX_FILE_NAME);
        if fs::try_exists(&path).await? {
            info!(file = INDEX_FILE_NAME, "already exists");
        } else {
            write_index_ts(&path, options).await?;
            info!(file = INDEX_FILE_NAME, "created");
        }
        Ok::<(), anyhow::Error>(())
    };

    let write_artifacts_task = future::try_join_all(artifacts.iter().map(|artifact| async move {
        let path = output_directory.join(&artifact.file_name);
        let result = overwrite_on_diff(&path, &artifact.content, &options.line_break).await?;
        result.log(&artifact.file_name);
        Ok::<FileWriteResult, anyhow::Error>(result)
    }));

    future::try_join(create_index_task, write_artifacts_task).await?;
    Ok(())
}

async fn write_index_ts(file_path: &Path, options: &CompileOptions) -> Result<()> {
    let template = include_str!("../resources/client.template")
        .replace("__RUNTIME_PACKAGE__", &options.runtime_package)
        .replace('\t', &options.indent)
        .replace('\n', &options.line_break);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(file_path)
        .await
        .with_context(|| format!("Unable to create new file {}", file_path.display()))?;
    file.write_all(template.as_bytes())
        .await
        .with_context(|| format!("Unable to write to new file {}", file_path.display()))?;
    file.flush().await?;
    Ok(())
}

/// Writes `new_content` behind a `// hash:` line unless the file already
/// carries the same hash.
pub async fn overwrite_on_diff(file_path: &Path, new_content: &str, line_break: &str) -> Result<FileWriteResult> {
    let new_content_hash = crc32fast::hash(new_content.as_bytes());

    let exists = fs::try_exists(file_path)
        .await
        .with_context(|| format!("Unable to access {}", file_path.display()))?;
    if exists {
        if read_embedded_hash(file_path).await? == Some(new_content_hash) {
            return Ok(FileWriteResult::NoChange);
        }
        write_all_with_hash(file_path, new_content, new_content_hash, line_break)
            .await
            .with_context(|| format!("Unable to write to file {}", file_path.display()))?;
        Ok(FileWriteResult::Overwritten)
    } else {
        write_all_with_hash(file_path, new_content, new_content_hash, line_break)
            .await
            .with_context(|| format!("Unable to create file {}", file_path.display()))?;
        Ok(FileWriteResult::Created)
    }
}

async fn read_embedded_hash(path: &Path) -> Result<Option<u32>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed while trying to open {} in order to read hash", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hash_line = String::new();
    // A first line that is not text cannot hold our hash.
    if reader.read_line(&mut hash_line).await.is_err() {
        return Ok(None);
    }
    Ok(hash_line
        .strip_prefix(EMBEDDED_HASH_PREFIX)
        .and_then(|hash| hash.trim_end().parse().ok()))
}

async fn write_all_with_hash(path: &Path, new_content: &str, hash: u32, line_break: &str) -> std::io::Result<()> {
    let content_with_hash = format!("{}{}{}{}", EMBEDDED_HASH_PREFIX, hash, line_break, new_content);
    fs::write(path, content_with_hash).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileWriteResult {
    Overwritten,
    NoChange,
    Created,
}

impl FileWriteResult {
    fn log(&self, file_name: &str) {
        match self {
            FileWriteResult::Created => info!(file = file_name, "created"),
            FileWriteResult::NoChange => info!(file = file_name, "skipped (no change)"),
            FileWriteResult::Overwritten => info!(file = file_name, "overwritten"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(content: &str) -> Artifact {
        Artifact {
            file_name: "schema.ts".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn unchanged_content_is_not_rewritten() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("schema.ts");

        let first = overwrite_on_diff(&path, "export {}\n", "\n").await.unwrap();
        assert_eq!(first, FileWriteResult::Created);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("// hash:{}\nexport {{}}\n", crc32fast::hash(b"export {}\n")));

        let second = overwrite_on_diff(&path, "export {}\n", "\n").await.unwrap();
        assert_eq!(second, FileWriteResult::NoChange);

        let third = overwrite_on_diff(&path, "export const a = 1\n", "\n").await.unwrap();
        assert_eq!(third, FileWriteResult::Overwritten);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("export const a = 1\n"));
    }

    #[tokio::test]
    async fn file_without_hash_is_overwritten() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("schema.ts");
        std::fs::write(&path, "hand written\n").unwrap();

        let result = overwrite_on_diff(&path, "generated\n", "\n").await.unwrap();
        assert_eq!(result, FileWriteResult::Overwritten);
    }

    #[tokio::test]
    async fn index_is_created_once() {
        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("generated");
        let options = CompileOptions {
            runtime_package: "@acme/runtime".to_string(),
            indent: "  ".to_string(),
            line_break: "\r\n".to_string(),
            ..CompileOptions::default()
        };

        write_files(&[artifact("export {}\r\n")], &output, &options).await.unwrap();
        let index = std::fs::read_to_string(output.join(INDEX_FILE_NAME)).unwrap();
        assert!(index.contains("from \"@acme/runtime\"\r\n"));
        assert!(index.contains("\r\n  scalars,\r\n"));
        assert!(output.join("schema.ts").exists());

        std::fs::write(output.join(INDEX_FILE_NAME), "edited").unwrap();
        write_files(&[artifact("export {}\r\n")], &output, &options).await.unwrap();
        assert_eq!(std::fs::read_to_string(output.join(INDEX_FILE_NAME)).unwrap(), "edited");
    }

    #[tokio::test]
    async fn missing_parent_directory_is_reported() {
        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("missing").join("generated");
        let error = write_files(&[artifact("")], &output, &CompileOptions::default())
            .await
            .unwrap_err();
        assert!(error.to_string().starts_with("Unable to create output directory"));
    }
}
