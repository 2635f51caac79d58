/// Метаданные UseCase для идентификации и документирования
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u501")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "sync_ozon")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для логов и отчёта
    fn display_name() -> &'static str;

    /// Полное имя вида "u501_sync_ozon"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
