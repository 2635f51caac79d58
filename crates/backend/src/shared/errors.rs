use super::config::ConfigError;

/// Категория сбоя, определяющая сообщение пользователю
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    Config,
    Other,
}

impl FailureKind {
    /// Разобрать цепочку ошибок: первая найденная ошибка reqwest или
    /// конфигурации определяет категорию.
    pub fn classify(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
                if e.is_timeout() {
                    return FailureKind::Timeout;
                }
                if e.is_connect() {
                    return FailureKind::Connection;
                }
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return FailureKind::Config;
            }
        }
        FailureKind::Other
    }
}

/// Сообщение для пользователя по итогам неудачного запуска
pub fn user_message(error: &anyhow::Error) -> String {
    match FailureKind::classify(error) {
        FailureKind::Timeout => "Превышено время ожидания...".to_string(),
        FailureKind::Connection => format!("Ошибка соединения: {:#}", error),
        FailureKind::Config => format!("Ошибка конфигурации: {:#}", error),
        FailureKind::Other => format!("Ошибка: {:#}", error),
    }
}
