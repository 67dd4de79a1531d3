//! GraphQL scalar helpers.

use std::{fmt, marker::PhantomData, str::FromStr};

use derive_more::{AsRef, Display, From, Into};
use juniper::{
    GraphQLScalar, GraphQLType, InputValue, ParseScalarResult,
    ParseScalarValue, ScalarToken, ScalarValue, Value,
};

/// Adapter for `#[graphql(with = ..)]` attributes representing a domain
/// newtype as a string scalar through the [`FromStr`] and [`Display`] impls
/// of its `As` inner type.
///
/// The target type is expected to implement [`AsRef`] and [`TryFrom`] for
/// `As`, so its validation rules are applied to the GraphQL input as well.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Outputs the target `value` as a string scalar.
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::scalar(value.as_ref().to_string())
    }

    /// Parses the target type out of a string scalar.
    ///
    /// # Errors
    ///
    /// If the `input` is not a string, cannot be parsed as `As`, or is
    /// rejected by the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("String");
        let Some(s) = input.as_string_value() else {
            return Err(format!(
                "Cannot parse input scalar `{name}`: expected string input \
                 value, found: {input}",
            ));
        };

        let parsed = s.parse::<As>().map_err(|e| {
            format!("Cannot parse input scalar `{name}` from \"{s}\": {e}")
        })?;
        T::try_from(parsed)
            .map_err(|e| format!("Cannot parse input scalar `{name}`: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Decimal number in its plain notation, like `22.5`.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = Via::<rust_decimal::Decimal>)]
pub struct Decimal(rust_decimal::Decimal);
