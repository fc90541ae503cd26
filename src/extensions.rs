pub trait ResultExtensions<T, E> {
    fn pure(item: T) -> Result<T, E>;
}

impl<T, E> ResultExtensions<T, E> for Result<T, E> {
    fn pure(item: T) -> Result<T, E> {
        Ok(item)
    }
}
