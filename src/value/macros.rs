/// Construct JSON-like [`Value`]s by using JSON syntax
///
/// [`Value`] objects are constructed via the syntax `{"key": value, ...}`,
/// list values with `[element, ...]`, and `null` constructs
/// [`Value::Null`]. Everything else goes through `Value::from`.
///
/// [`Value`]: crate::Value
/// [`Value::Null`]: crate::Value::Null
///
/// # Example
///
/// ```rust
/// # use tamarack::{graphql_value, Value};
/// #
/// # fn main() {
/// let value: Value = graphql_value!({
///     "key": 123,
///     "list": [null, true],
/// });
/// # }
/// ```
#[macro_export]
macro_rules! graphql_value {
    (null) => {
        $crate::Value::null()
    };
    ([ $($arg:tt),* $(,)? ]) => {
        $crate::Value::list(vec![ $( $crate::graphql_value!($arg) ),* ])
    };
    ({ $($key:tt : $val:tt),* $(,)? }) => {
        $crate::Value::object(
            [ $( ($key, $crate::graphql_value!($val)) ),* ]
                .into_iter()
                .collect::<$crate::Object>(),
        )
    };
    ($e:expr) => {
        $crate::Value::from($e)
    };
}

/// Construct [`InputValue`]s by using JSON-like syntax
///
/// In addition to the JSON forms accepted by [`graphql_value!`], a bare
/// identifier constructs an enum value and `@ident` constructs a variable
/// reference.
///
/// [`InputValue`]: crate::InputValue
///
/// # Example
///
/// ```rust
/// # use tamarack::{graphql_input_value, InputValue};
/// #
/// # fn main() {
/// let value: InputValue = graphql_input_value!({
///     "episode": JEDI,
///     "deep": [12.5, null],
/// });
/// let var: InputValue = graphql_input_value!(@id);
/// # }
/// ```
#[macro_export]
macro_rules! graphql_input_value {
    (null) => {
        $crate::InputValue::null()
    };
    (@ $var:ident) => {
        $crate::InputValue::variable(stringify!($var))
    };
    ([ $($arg:tt),* $(,)? ]) => {
        $crate::InputValue::list(vec![ $( $crate::graphql_input_value!($arg) ),* ])
    };
    ({ $($key:tt : $val:tt),* $(,)? }) => {
        $crate::InputValue::object(
            [ $( (String::from($key), $crate::graphql_input_value!($val)) ),* ]
                .into_iter()
                .collect(),
        )
    };
    ($e:ident) => {
        $crate::InputValue::enum_value(stringify!($e))
    };
    ($e:expr) => {
        $crate::InputValue::from($e)
    };
}

/// Construct a [`Variables`] map by using JSON-like syntax
///
/// Keys are variable names without the leading `$`, values follow
/// [`graphql_input_value!`] syntax.
///
/// [`Variables`]: crate::Variables
///
/// # Example
///
/// ```rust
/// # use tamarack::{graphql_vars, Variables};
/// #
/// # fn main() {
/// let vars: Variables = graphql_vars! {"episode": JEDI, "id": 123};
/// # }
/// ```
#[macro_export]
macro_rules! graphql_vars {
    () => {
        $crate::Variables::new()
    };
    ( $($key:tt : $val:tt),* $(,)? ) => {
        [ $( (String::from($key), $crate::graphql_input_value!($val)) ),* ]
            .into_iter()
            .collect::<$crate::Variables>()
    };
}
