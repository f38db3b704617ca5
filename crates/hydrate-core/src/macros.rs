#[macro_export]
macro_rules! values {
    (
        $( $value:expr ),* $(,)?
    ) => {
        vec![ $( $crate::Value::from($value), )* ]
    };
}
