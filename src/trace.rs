//! Per-layer input/output snapshots.
//!
//! Purely observational: the pipeline writes a [`Trace`] while it runs and
//! never reads it back.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::alphabet::{render, Residue};
use crate::layers::{Direction, Layer};

/// One layer's rendered input and output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LayerStep {
    pub input: String,
    pub output: String,
    pub description: &'static str,
}

/// Steps in execution order.
///
/// Serializes as a JSON object keyed by layer name (`"DKSS"`, `"NRPE"`,
/// ...), in the order the layers ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<(Layer, LayerStep)>,
}

impl Trace {
    pub fn new() -> Self {
        Self {
            steps: Vec::with_capacity(Layer::PIPELINE.len()),
        }
    }

    pub(crate) fn record(
        &mut self,
        layer: Layer,
        direction: Direction,
        input: &[Residue],
        output: &[Residue],
    ) {
        tracing::trace!(
            layer = layer.name(),
            input_len = input.len(),
            output_len = output.len(),
            "layer done"
        );
        self.steps.push((
            layer,
            LayerStep {
                input: render(input),
                output: render(output),
                description: layer.description(direction),
            },
        ));
    }

    pub fn get(&self, layer: Layer) -> Option<&LayerStep> {
        self.steps
            .iter()
            .find(|(l, _)| *l == layer)
            .map(|(_, step)| step)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Layer, &LayerStep)> {
        self.steps.iter().map(|(l, step)| (*l, step))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.steps.len()))?;
        for (layer, step) in &self.steps {
            map.serialize_entry(layer.name(), step)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_renders() {
        let mut t = Trace::new();
        t.record(Layer::Kdpp, Direction::Inverse, &[0, 1], &[1, 0]);
        t.record(Layer::Vbmd, Direction::Inverse, &[1, 0], &[2, 3]);
        assert_eq!(t.len(), 2);
        let names: Vec<&str> = t.iter().map(|(l, _)| l.name()).collect();
        assert_eq!(names, ["KDPP", "VBMD"]);

        let kdpp = t.get(Layer::Kdpp).unwrap();
        assert_eq!(kdpp.input, "AB");
        assert_eq!(kdpp.output, "BA");
        assert!(kdpp.description.starts_with("Inverse"));
        assert!(t.get(Layer::Dkss).is_none());
    }

    #[test]
    fn serializes_as_keyed_object() {
        let mut t = Trace::new();
        t.record(Layer::Dkss, Direction::Forward, &[7], &[17]);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["DKSS"]["input"], "H");
        assert_eq!(json["DKSS"]["output"], "R");
        assert_eq!(
            json["DKSS"]["description"],
            "Dynamic Key-Shift Substitution applied"
        );
    }
}
