//! [`Config`]-related definitions.

use std::{fmt, str::FromStr};

use common::Percent;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Display, Error as StdError};
use serde::Deserialize;
use service::{
    domain::{self, add_on, car, coverage},
    pricing,
};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Pricing configuration.
    pub pricing: Pricing,

    /// Fleet configuration.
    pub fleet: Fleet,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Pricing configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Pricing {
    /// Quantity of a `MANUAL_QTY` add-on selected without one.
    ///
    /// Either `rental_days` or a fixed number of units.
    #[default("rental_days".to_owned())]
    pub default_manual_quantity: String,

    /// Add-ons available for selection.
    pub add_ons: Vec<AddOn>,

    /// Coverage packages available for any car.
    pub coverage_packages: Vec<CoveragePackage>,
}

impl TryFrom<Pricing> for service::Config {
    type Error = InvalidValue;

    fn try_from(value: Pricing) -> Result<Self, Self::Error> {
        let Pricing {
            default_manual_quantity,
            add_ons,
            coverage_packages,
        } = value;

        Ok(Self {
            pricing: pricing::Catalog {
                add_ons: add_ons
                    .into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<_, _>>()?,
                coverage_packages: coverage_packages
                    .into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<_, _>>()?,
                default_manual_quantity: parse(
                    "pricing.default_manual_quantity",
                    &default_manual_quantity,
                )?,
            },
        })
    }
}

/// Add-on configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct AddOn {
    /// Slug identifying the add-on, like `child-seat`.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// One of `PER_DAY`, `ONE_TIME` or `MANUAL_QTY`.
    pub pricing_mode: String,

    /// Price of a single unit, like `6.00USD`.
    pub unit_price: String,
}

impl TryFrom<AddOn> for domain::AddOn {
    type Error = InvalidValue;

    fn try_from(value: AddOn) -> Result<Self, Self::Error> {
        let AddOn {
            id,
            name,
            pricing_mode,
            unit_price,
        } = value;

        let pricing_mode: add_on::PricingMode =
            parse("add_ons.pricing_mode", &pricing_mode)?;
        Ok(Self {
            id: parse("add_ons.id", &id)?,
            name,
            is_quantity_editable: pricing_mode
                == add_on::PricingMode::ManualQty,
            pricing_mode,
            unit_price: parse("add_ons.unit_price", &unit_price)?,
        })
    }
}

/// Coverage package configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct CoveragePackage {
    /// Slug identifying the package.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Markup applied to the daily price, in percent.
    ///
    /// Not bounded by `100`, unlike the other percents.
    pub price_percent: String,

    /// Share of the deposit still owed, in percent.
    pub deposit_remaining_percent: String,
}

impl TryFrom<CoveragePackage> for coverage::Package {
    type Error = InvalidValue;

    fn try_from(value: CoveragePackage) -> Result<Self, Self::Error> {
        let CoveragePackage {
            id,
            name,
            price_percent,
            deposit_remaining_percent,
        } = value;

        Ok(Self {
            id: parse("coverage_packages.id", &id)?,
            name,
            price_percent: parse(
                "coverage_packages.price_percent",
                &price_percent,
            )?,
            deposit_remaining_percent: parse(
                "coverage_packages.deposit_remaining_percent",
                &deposit_remaining_percent,
            )?,
        })
    }
}

/// Fleet configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fleet {
    /// Cars loaded into the store on startup.
    pub cars: Vec<Car>,
}

/// Car configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Car {
    /// UUID of the car, generated if omitted.
    #[serde(default)]
    pub id: Option<String>,

    /// Pricing segment, like `economy`.
    pub segment: String,

    /// Daily-rate tiers, in ascending order.
    pub tariffs: Vec<Tariff>,

    /// Coverage plans offered with the car.
    #[serde(default)]
    pub coverage_plans: Vec<CoveragePlan>,

    /// Promotional discount of the daily price, in percent.
    #[serde(default)]
    pub discount: Option<String>,
}

impl TryFrom<Car> for domain::Car {
    type Error = InvalidValue;

    fn try_from(value: Car) -> Result<Self, Self::Error> {
        let Car {
            id,
            segment,
            tariffs,
            coverage_plans,
            discount,
        } = value;

        Ok(Self {
            id: id
                .map(|id| parse("fleet.cars.id", &id))
                .transpose()?
                .unwrap_or_else(car::Id::new),
            segment: parse("fleet.cars.segment", &segment)?,
            tariffs: tariffs
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?
                .into(),
            coverage_plans: coverage_plans
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            discount: discount
                .map(|d| parse("fleet.cars.discount", &d))
                .transpose()?
                .unwrap_or(Percent::ZERO),
        })
    }
}

/// Tariff tier configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Tariff {
    /// Minimal number of rental days the tier applies to.
    pub min_days: u32,

    /// Maximal number of rental days the tier applies to, `0` for unbounded.
    #[serde(default)]
    pub max_days: u32,

    /// Price of a single day, like `40.00USD`.
    pub daily_price: String,

    /// Deposit of the whole rental, like `500.00USD`.
    pub deposit: String,
}

impl TryFrom<Tariff> for car::Tariff {
    type Error = InvalidValue;

    fn try_from(value: Tariff) -> Result<Self, Self::Error> {
        let Tariff {
            min_days,
            max_days,
            daily_price,
            deposit,
        } = value;

        Ok(Self {
            min_days,
            max_days,
            daily_price: parse("fleet.cars.tariffs.daily_price", &daily_price)?,
            deposit: parse("fleet.cars.tariffs.deposit", &deposit)?,
        })
    }
}

/// Coverage plan configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct CoveragePlan {
    /// Slug identifying the plan.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Markup applied to the daily price, in percent.
    ///
    /// Not bounded by `100`, unlike the other percents.
    pub price_percent: String,

    /// Share of the deposit waived, in percent.
    pub deposit_waived_percent: String,
}

impl TryFrom<CoveragePlan> for coverage::Plan {
    type Error = InvalidValue;

    fn try_from(value: CoveragePlan) -> Result<Self, Self::Error> {
        let CoveragePlan {
            id,
            name,
            price_percent,
            deposit_waived_percent,
        } = value;

        Ok(Self {
            id: parse("fleet.cars.coverage_plans.id", &id)?,
            name,
            price_percent: parse(
                "fleet.cars.coverage_plans.price_percent",
                &price_percent,
            )?,
            deposit_waived_percent: parse(
                "fleet.cars.coverage_plans.deposit_waived_percent",
                &deposit_waived_percent,
            )?,
        })
    }
}

/// Configuration value that cannot be converted into its domain type.
#[derive(Clone, Debug, Display, StdError)]
#[display("invalid `{field}` value `{value}`: {reason}")]
pub struct InvalidValue {
    /// Path of the invalid field.
    pub field: &'static str,

    /// Invalid value itself.
    pub value: String,

    /// Reason the value is rejected.
    pub reason: String,
}

/// Parses the `value` of the configuration `field`.
fn parse<T>(field: &'static str, value: &str) -> Result<T, InvalidValue>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| InvalidValue {
        field,
        value: value.to_owned(),
        reason: e.to_string(),
    })
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
