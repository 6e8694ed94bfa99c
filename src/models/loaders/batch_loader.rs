use crate::error::{AppError, FileError, ValidationError};
use std::path::Path;
use tokio::fs;

/// 批量导入允许的文件扩展名
const BATCH_EXTENSIONS: [&str; 2] = ["txt", "csv"];

/// 检查批量导入文件的扩展名
///
/// 在调用解析服务之前执行，不合格的文件不会产生任何远程调用。
pub fn validate_batch_file(path: &Path) -> Result<(), ValidationError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension {
        Some(ext) if BATCH_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::UnsupportedBatchFile {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }),
    }
}

/// 读取批量导入文件的文本内容
pub async fn read_batch_text(path: &Path) -> Result<String, AppError> {
    validate_batch_file(path)?;

    let text = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_txt_and_csv() {
        assert!(validate_batch_file(Path::new("courses.txt")).is_ok());
        assert!(validate_batch_file(Path::new("courses.CSV")).is_ok());
    }

    #[test]
    fn test_rejects_other_extensions() {
        let err = validate_batch_file(Path::new("dir/courses.xlsx")).unwrap_err();
        match err {
            ValidationError::UnsupportedBatchFile { file_name } => {
                assert_eq!(file_name, "courses.xlsx")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(validate_batch_file(Path::new("courses")).is_err());
    }

    #[tokio::test]
    async fn test_read_batch_text_rejects_before_reading() {
        // 文件不存在，但扩展名先被拒绝
        let err = read_batch_text(Path::new("/nonexistent/a.pdf")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_read_batch_text_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.csv");
        std::fs::write(&path, "情绪识别,3-5岁\n同理心,6-8岁\n").unwrap();

        let text = tokio_test::block_on(read_batch_text(&path)).unwrap();
        assert_eq!(text, "情绪识别,3-5岁\n同理心,6-8岁\n");
    }
}
