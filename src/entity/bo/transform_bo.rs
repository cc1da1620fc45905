//! edits of the server color transform
//! the transform object itself stays opaque json, only the touched key changes

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    pub fn parse(name: &str) -> Option<Channel> {
        match name {
            "r" | "red" => Some(Channel::Red),
            "g" | "green" => Some(Channel::Green),
            "b" | "blue" => Some(Channel::Blue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformAdjustmentBo {
    Gamma(Channel, f64),
    Whitelevel(Channel, f64),
    Blacklevel(Channel, f64),
    Threshold(Channel, f64),
    ValueGain(f64),
    SaturationGain(f64),
}

impl TransformAdjustmentBo {
    /// `kind` is a transform key, the per channel kinds need a channel
    pub fn parse(kind: &str, channel: Option<&str>, value: f64) -> Option<Self> {
        let channel = channel.and_then(Channel::parse);
        let adjustment = match (kind, channel) {
            ("gamma", Some(c)) => TransformAdjustmentBo::Gamma(c, value),
            ("whitelevel", Some(c)) => TransformAdjustmentBo::Whitelevel(c, value),
            ("blacklevel", Some(c)) => TransformAdjustmentBo::Blacklevel(c, value),
            ("threshold", Some(c)) => TransformAdjustmentBo::Threshold(c, value),
            ("valueGain", _) => TransformAdjustmentBo::ValueGain(value),
            ("saturationGain", _) => TransformAdjustmentBo::SaturationGain(value),
            _ => return None,
        };
        Some(adjustment)
    }

    fn key(&self) -> &'static str {
        match self {
            TransformAdjustmentBo::Gamma(..) => "gamma",
            TransformAdjustmentBo::Whitelevel(..) => "whitelevel",
            TransformAdjustmentBo::Blacklevel(..) => "blacklevel",
            TransformAdjustmentBo::Threshold(..) => "threshold",
            TransformAdjustmentBo::ValueGain(_) => "valueGain",
            TransformAdjustmentBo::SaturationGain(_) => "saturationGain",
        }
    }

    /// write the adjustment into `transform`, creating missing keys
    pub fn apply(&self, transform: &mut Value) {
        if !transform.is_object() {
            *transform = Value::Object(serde_json::Map::new());
        }
        let key = self.key();
        match *self {
            TransformAdjustmentBo::Gamma(channel, value)
            | TransformAdjustmentBo::Whitelevel(channel, value)
            | TransformAdjustmentBo::Blacklevel(channel, value)
            | TransformAdjustmentBo::Threshold(channel, value) => {
                let entry = &mut transform[key];
                if !entry.is_array() {
                    *entry = Value::Array(Vec::new());
                }
                if let Some(array) = entry.as_array_mut() {
                    while array.len() < 3 {
                        array.push(Value::from(0.0));
                    }
                    array[channel as usize] = Value::from(value);
                }
            }
            TransformAdjustmentBo::ValueGain(value)
            | TransformAdjustmentBo::SaturationGain(value) => {
                transform[key] = Value::from(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_edit_keeps_other_channels() {
        let mut transform = json!({"id": "default", "gamma": [1.5, 1.6, 1.7], "valueGain": 1.0});
        TransformAdjustmentBo::Gamma(Channel::Green, 2.2).apply(&mut transform);
        assert_eq!(transform["gamma"], json!([1.5, 2.2, 1.7]));
        assert_eq!(transform["id"], "default");

        TransformAdjustmentBo::SaturationGain(1.2).apply(&mut transform);
        assert_eq!(transform["saturationGain"], json!(1.2));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            TransformAdjustmentBo::parse("gamma", Some("g"), 2.0),
            Some(TransformAdjustmentBo::Gamma(Channel::Green, 2.0))
        );
        assert_eq!(
            TransformAdjustmentBo::parse("valueGain", None, 1.1),
            Some(TransformAdjustmentBo::ValueGain(1.1))
        );
        assert_eq!(TransformAdjustmentBo::parse("gamma", None, 2.0), None);
        assert_eq!(TransformAdjustmentBo::parse("gamma", Some("x"), 2.0), None);
        assert_eq!(TransformAdjustmentBo::parse("contrast", Some("r"), 2.0), None);
    }

    #[test]
    fn test_missing_key_is_created() {
        let mut transform = Value::Null;
        TransformAdjustmentBo::Threshold(Channel::Blue, 0.1).apply(&mut transform);
        assert_eq!(transform, json!({"threshold": [0.0, 0.0, 0.1]}));
    }
}
