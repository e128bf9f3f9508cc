//! Types for use when configuring slush modules.

use crate::*;

/// Marker for types carrying the static configuration of one slush
/// module.
///
/// Anything bound by this trait round-trips through json, which is how a
/// [Config] stores it. Keep the serde side tolerant: a file edited by
/// hand may omit properties, and a missing property should fall back to
/// its default rather than fail the load.
pub trait ModConfig:
    'static
    + Sized
    + Default
    + std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
{
}

/// Slush configuration: a json map keyed by module name.
///
/// Factories register their defaults here when a builder assembles an
/// example configuration, and read their own section back out when
/// modules are constructed. Sections that belong to modules not in use
/// are carried along untouched.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Config(serde_json::Map<String, serde_json::Value>);

impl Config {
    /// Register the default configuration of module `M` under
    /// `module_name`.
    ///
    /// Registering a module name twice is refused, since two factories
    /// writing the same section would silently shadow each other.
    pub fn add_default_module_config<M: ModConfig>(
        &mut self,
        module_name: String,
    ) -> SlushResult<()> {
        match self.0.entry(module_name) {
            serde_json::map::Entry::Occupied(e) => {
                Err(SlushError::other(format!(
                    "module config {} is already registered",
                    e.key(),
                )))
            }
            serde_json::map::Entry::Vacant(e) => {
                let value =
                    serde_json::to_value(M::default()).map_err(|err| {
                        SlushError::other(format!(
                            "unencodable module config: {err}"
                        ))
                    })?;
                e.insert(value);
                Ok(())
            }
        }
    }

    /// Extract the configuration of module `M` stored under
    /// `module_name`.
    ///
    /// A name with no section yields `M::default()`, so a config loaded
    /// from a sparse or hand-written file still constructs every module.
    pub fn get_module_config<M: ModConfig>(
        &self,
        module_name: &str,
    ) -> SlushResult<M> {
        let Some(value) = self.0.get(module_name) else {
            return Ok(M::default());
        };
        serde_json::from_value(value.clone()).map_err(|err| {
            SlushError::other(format!("invalid {module_name} config: {err}"))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_usage_example() {
        #[derive(
            Debug, Default, serde::Serialize, serde::Deserialize, PartialEq,
        )]
        #[serde(rename_all = "camelCase")]
        struct SelMod {
            #[serde(default)]
            compact_pct: u32,
            #[serde(default)]
            label: String,
        }

        impl ModConfig for SelMod {}

        let mut config = Config::default();
        config
            .add_default_module_config::<SelMod>("sel".into())
            .unwrap();

        // a second registration under the same name must be refused
        assert!(config
            .add_default_module_config::<SelMod>("sel".into())
            .is_err());

        // output the "default" config
        assert_eq!(
            r#"{"sel":{"compactPct":0,"label":""}}"#,
            serde_json::to_string(&config).unwrap().as_str(),
        );

        // ensure we can load a human-edited config with extraneous
        // modules and missing properties
        let config: Config = serde_json::from_str(
            r#"{
              "modUNKNOWN": { "foo": "bar" },
              "sel": { "compactPct": 42 }
            }"#,
        )
        .unwrap();

        assert_eq!(
            SelMod {
                compact_pct: 42,
                label: "".to_string(),
            },
            config.get_module_config::<SelMod>("sel").unwrap(),
        );

        // unset mods get the default
        assert_eq!(
            SelMod::default(),
            config.get_module_config::<SelMod>("NOT-SET").unwrap(),
        );
    }
}
