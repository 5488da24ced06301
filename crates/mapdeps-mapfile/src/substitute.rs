//! Default runtime substitutions.
//!
//! A layer may carry `%key%` placeholders that are normally filled from the
//! request. When a VALIDATION block declares `default_key`, that value is
//! applied so path-bearing fields point at something concrete.

use crate::types::{Layer, Map};

const DEFAULT_PREFIX: &str = "default_";

fn defaults(validation: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    validation.iter().filter_map(|(key, value)| {
        let lower = key.to_ascii_lowercase();
        lower
            .starts_with(DEFAULT_PREFIX)
            .then(|| (&key[DEFAULT_PREFIX.len()..], value.as_str()))
    })
}

fn substitute(field: &mut Option<String>, key: &str, value: &str) {
    if let Some(text) = field {
        let token = format!("%{}%", key);
        if text.contains(&token) {
            *text = text.replace(&token, value);
        }
    }
}

fn apply_to_layer(layer: &mut Layer, key: &str, value: &str) {
    for field in [
        &mut layer.data,
        &mut layer.tileindex,
        &mut layer.connection,
        &mut layer.header,
        &mut layer.footer,
        &mut layer.template,
    ] {
        substitute(field, key, value);
    }
}

/// Apply `default_*` values from layer VALIDATION blocks, then from the
/// WEB VALIDATION block, to every layer's path-bearing fields.
pub fn apply_default_substitutions(map: &mut Map) {
    let web_defaults: Vec<(String, String)> = defaults(&map.web.validation)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for layer in &mut map.layers {
        let layer_defaults: Vec<(String, String)> = defaults(&layer.validation)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in layer_defaults.iter().chain(&web_defaults) {
            apply_to_layer(layer, key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_default_wins_over_web_default() {
        let mut map = Map::default();
        map.web.validation = vec![("default_region".into(), "south".into())];
        map.layers.push(Layer {
            data: Some("roads_%region%".into()),
            tileindex: Some("%region%/index".into()),
            validation: vec![("DEFAULT_region".into(), "north".into())],
            ..Layer::default()
        });

        apply_default_substitutions(&mut map);

        assert_eq!(map.layers[0].data.as_deref(), Some("roads_north"));
        assert_eq!(map.layers[0].tileindex.as_deref(), Some("north/index"));
    }

    #[test]
    fn test_web_default_applies_when_layer_has_none() {
        let mut map = Map::default();
        map.web.validation = vec![("default_year".into(), "2016".into())];
        map.layers.push(Layer {
            data: Some("imagery_%year%.tif".into()),
            ..Layer::default()
        });

        apply_default_substitutions(&mut map);

        assert_eq!(map.layers[0].data.as_deref(), Some("imagery_2016.tif"));
    }

    #[test]
    fn test_non_default_keys_are_ignored() {
        let mut map = Map::default();
        map.layers.push(Layer {
            data: Some("%name%".into()),
            validation: vec![("name".into(), "^[a-z]+$".into())],
            ..Layer::default()
        });

        apply_default_substitutions(&mut map);

        assert_eq!(map.layers[0].data.as_deref(), Some("%name%"));
    }
}
