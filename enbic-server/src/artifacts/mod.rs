//! Artifact Store
//!
//! 签名单据、回执等文件以 data URL (`data:<mime>;base64,<payload>`) 形式上传，
//! 解码后写入 `{WORK_DIR}/artifacts/<kind>/`。数据库中只保存相对路径。
//!
//! - 文件名包含内容 SHA256 前缀，便于排查重复上传
//! - 写入先落临时文件再 rename
//! - 读取时拒绝任何逃逸出根目录的路径

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use shared::{AppError, AppResult, ErrorCode};
use std::path::{Component, Path, PathBuf};

/// 文件分类 (子目录)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// 派送单 / 签名单据
    Dispatch,
    /// 送达回执
    Confirmation,
    /// 发放单
    IssueNote,
}

impl ArtifactKind {
    pub const fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Dispatch => "dispatch",
            ArtifactKind::Confirmation => "confirmations",
            ArtifactKind::IssueNote => "issue-notes",
        }
    }
}

/// 解码后的上传内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// 读取到的文件
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 已解码、尚未落盘的文件 (`<kind>/<label>-<hash>.<ext>`)
#[derive(Debug, Clone)]
pub struct PendingArtifact {
    kind: ArtifactKind,
    file_name: String,
    path: String,
    bytes: Vec<u8>,
}

impl PendingArtifact {
    fn new(kind: ArtifactKind, label: &str, extension: &str, bytes: Vec<u8>) -> Self {
        let hash = content_hash(&bytes);
        let file_name = format!("{}-{}.{}", sanitize(label), &hash[..16], extension);
        let path = format!("{}/{}", kind.dir_name(), file_name);
        Self {
            kind,
            file_name,
            path,
            bytes,
        }
    }

    /// 相对于存储根目录的路径，写入数据库
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn invalid_file(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::InvalidFileData, msg)
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::with_message(
        ErrorCode::FileTooLarge,
        format!("File exceeds the maximum size of {} bytes", max_bytes),
    )
    .with_detail("max_bytes", max_bytes)
}

/// 解析 `data:<mime>;base64,<payload>`
pub fn parse_data_url(data: &str, max_bytes: usize) -> AppResult<DecodedFile> {
    let rest = data
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid_file("File data must be a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid_file("Data URL has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| invalid_file("Data URL must be base64 encoded"))?;
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };

    // 粗略预检，避免解码超大负载
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(too_large(max_bytes));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid_file(format!("Invalid base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(invalid_file("File data is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    Ok(DecodedFile {
        mime: mime.to_ascii_lowercase(),
        bytes,
    })
}

/// MIME → 扩展名，未知类型为 `bin`
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "text/html" => "html",
        "text/plain" => "txt",
        _ => mime_guess::get_mime_extensions_str(mime)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// 文件存储
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// 解码 data URL 并确定存放路径，不写磁盘
    ///
    /// 调用方先在事务中用 [`PendingArtifact::path`] 完成条件更新，
    /// 成功后再 [`ArtifactStore::write`]，失败的请求不会留下文件。
    pub fn prepare_data_url(
        &self,
        kind: ArtifactKind,
        label: &str,
        data_url: &str,
    ) -> AppResult<PendingArtifact> {
        let file = parse_data_url(data_url, self.max_bytes)?;
        let extension = extension_for(&file.mime);
        Ok(PendingArtifact::new(kind, label, extension, file.bytes))
    }

    /// 原始字节的待写文件
    pub fn prepare_bytes(
        &self,
        kind: ArtifactKind,
        label: &str,
        extension: &str,
        bytes: Vec<u8>,
    ) -> PendingArtifact {
        PendingArtifact::new(kind, label, extension, bytes)
    }

    /// 写入待写文件 (临时文件 + rename)
    pub async fn write(&self, artifact: &PendingArtifact) -> AppResult<()> {
        let dir = self.root.join(artifact.kind.dir_name());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("create artifact directory", e))?;

        let target = dir.join(&artifact.file_name);
        let temp = dir.join(format!(".{}.{}.tmp", artifact.file_name, uuid::Uuid::new_v4()));
        tokio::fs::write(&temp, &artifact.bytes)
            .await
            .map_err(|e| storage_error("write artifact", e))?;
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(storage_error("move artifact into place", e));
        }

        tracing::debug!(
            kind = artifact.kind.dir_name(),
            file = %artifact.file_name,
            size = artifact.bytes.len(),
            "Artifact stored"
        );
        Ok(())
    }

    /// 读取相对路径的文件
    pub async fn read(&self, relative: &str) -> AppResult<StoredFile> {
        let path = self.resolve(relative)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::with_message(
                    ErrorCode::FileNotFound,
                    format!("File not found: {relative}"),
                ));
            }
            Err(e) => return Err(storage_error("read artifact", e)),
        };
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(StoredFile {
            content_type,
            bytes,
        })
    }

    /// 相对路径 → 绝对路径，只允许普通路径分量
    fn resolve(&self, relative: &str) -> AppResult<PathBuf> {
        let rel = Path::new(relative);
        let safe = !relative.is_empty()
            && rel
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            crate::security_log!("WARN", "artifact_path_rejected", path = relative.to_string());
            return Err(invalid_file(format!("Invalid artifact path: {relative}")));
        }
        Ok(self.root.join(rel))
    }
}

fn storage_error(action: &str, err: std::io::Error) -> AppError {
    tracing::error!("Failed to {}: {}", action, err);
    AppError::with_message(ErrorCode::StorageError, format!("Failed to {action}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_parse_data_url() {
        let file = parse_data_url(PNG_DATA_URL, 1024).unwrap();
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.bytes, vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_parse_data_url_rejects_malformed() {
        for bad in [
            "image/png;base64,AAAA",
            "data:image/png,AAAA",
            "data:image/png;base64",
            "data:image/png;base64,***",
        ] {
            let err = parse_data_url(bad, 1024).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFileData, "{bad}");
        }
    }

    #[test]
    fn test_parse_data_url_size_cap() {
        let err = parse_data_url(PNG_DATA_URL, 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/pdf"), "pdf");
        assert_eq!(extension_for("application/x-unknown-thing"), "bin");
    }

    #[tokio::test]
    async fn test_prepare_then_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), 1024);

        let pending = store
            .prepare_data_url(ArtifactKind::Dispatch, "B-1/operator", PNG_DATA_URL)
            .unwrap();
        assert!(pending.path().starts_with("dispatch/B-1_operator-"));
        assert!(pending.path().ends_with(".png"));
        // 写入前不落盘
        assert!(!dir.path().join("dispatch").exists());

        store.write(&pending).await.unwrap();
        let file = store.read(pending.path()).await.unwrap();
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.bytes.len(), 8);

        // 无临时文件残留
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("dispatch"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_write_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("artifacts");
        std::fs::write(&root, b"not a directory").unwrap();
        let store = ArtifactStore::new(&root, 1024);

        let pending = store.prepare_bytes(ArtifactKind::Dispatch, "note", "html", b"<p>x</p>".to_vec());
        let err = store.write(&pending).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
    }

    #[tokio::test]
    async fn test_read_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), 1024);
        for bad in ["../secret", "/etc/passwd", "dispatch/../../x", ""] {
            let err = store.read(bad).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFileData, "{bad}");
        }
        let missing = store.read("dispatch/missing.png").await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::FileNotFound);
    }
}
