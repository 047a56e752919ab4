//! Builds the variable mapping handed to the template engine when rendering
//! a test case's templates.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// `{ "test_scenario": { "values": <bindings> } }`, with `values` iterated in
/// the case's declared dimension order rather than sorted.
#[derive(Debug)]
pub struct TestScenarioContext<'a> {
    bindings: &'a [(String, String)],
}

impl<'a> TestScenarioContext<'a> {
    pub fn new(bindings: &'a [(String, String)]) -> Self {
        Self { bindings }
    }
}

impl Serialize for TestScenarioContext<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut outer = serializer.serialize_map(Some(1))?;
        outer.serialize_entry("test_scenario", &TestScenario { values: self.bindings })?;
        outer.end()
    }
}

struct TestScenario<'a> {
    values: &'a [(String, String)],
}

impl Serialize for TestScenario<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut outer = serializer.serialize_map(Some(1))?;
        outer.serialize_entry("values", &OrderedBindings(self.values))?;
        outer.end()
    }
}

struct OrderedBindings<'a>(&'a [(String, String)]);

impl Serialize for OrderedBindings<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
