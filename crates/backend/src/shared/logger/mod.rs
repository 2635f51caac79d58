use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Каталог для файлов логов
pub fn log_dir() -> PathBuf {
    std::path::Path::new("target").join("logs")
}

/// Дописать запись в журнал запросов к API (`target/logs/<file_name>`).
///
/// Ошибки записи игнорируются: журнал вспомогательный и не должен
/// прерывать синхронизацию.
///
/// # Примеры
/// ```ignore
/// logger::append_api_log("ozon_api_requests.log", "Response status: 200 OK");
/// ```
pub fn append_api_log(file_name: &str, message: &str) {
    let dir = log_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(file_name))
    {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(file, "[{}] {}", timestamp, message);
    }
}

/// Первые `limit` символов тела ответа, с многоточием если обрезано
pub fn preview(body: &str, limit: usize) -> String {
    let preview: String = body.chars().take(limit).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}
