use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("batch size must be greater than zero")]
pub struct BatchError;

/// Разбить список на последовательные пачки не больше `size` элементов.
/// Последняя пачка может быть короче; пустой список не даёт ни одной пачки.
pub fn divide<T>(items: &[T], size: usize) -> Result<std::slice::Chunks<'_, T>, BatchError> {
    if size == 0 {
        return Err(BatchError);
    }
    Ok(items.chunks(size))
}

/// Количество пачек, которое даст `divide`
pub fn batch_count(len: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    len.div_ceil(size)
}
