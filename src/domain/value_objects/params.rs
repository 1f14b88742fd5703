use crate::domain::errors::{KrakenError, KrakenResult};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Request parameters, kept sorted by name so the encoded body is deterministic
pub type Params = BTreeMap<String, String>;

/// Name of the replay-protection parameter injected into private calls
pub const NONCE_PARAM: &str = "nonce";

/// Form-encode parameters in key order (`a=1&b=2`), spaces as `+`
pub fn encode_params(params: &Params) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// One argument a method accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Name callers use in the argument map
    pub name: &'static str,
    /// Name sent on the wire (`close_order_type` goes out as `close[ordertype]`)
    pub wire: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            wire: name,
            required: false,
        }
    }

    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            wire: name,
            required: true,
        }
    }

    pub const fn renamed(name: &'static str, wire: &'static str) -> Self {
        Self {
            name,
            wire,
            required: false,
        }
    }
}

/// Select the arguments `method` accepts, renamed to their wire names
///
/// A missing required argument fails before any request is built. Arguments
/// outside the allow-list are dropped.
pub fn prepare_params(
    method: &str,
    specs: &[ParamSpec],
    args: &HashMap<String, String>,
) -> KrakenResult<Params> {
    let mut params = Params::new();

    for spec in specs {
        match args.get(spec.name) {
            Some(value) => {
                params.insert(spec.wire.to_string(), value.clone());
            }
            None if spec.required => {
                return Err(KrakenError::Construction(format!(
                    "{} requires parameter '{}'",
                    method, spec.name
                )));
            }
            None => {}
        }
    }

    for name in args.keys() {
        if !specs.iter().any(|spec| spec.name == name) {
            debug!(method, parameter = %name, "Dropping parameter not accepted by method");
        }
    }

    Ok(params)
}
