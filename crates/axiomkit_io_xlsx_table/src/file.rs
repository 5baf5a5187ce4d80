//! Output file context: a sink plus the rules whose styles it registered.

use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::registry::Registry;
use crate::sink::TableSink;
use crate::spec::SpecFileRule;
use crate::xlsx::XlsxSink;

/// One output target with every rule style registered once.
///
/// Rules are snapshotted at creation, highest priority first; rules
/// registered afterwards do not apply to this file.
pub struct TableFile<S: TableSink> {
    sink: S,
    registry: Registry,
    l_rules: Vec<SpecFileRule>,
}

impl<S: TableSink> TableFile<S> {
    /// Snapshot the rules of `registry` and register their styles with `sink`.
    ///
    /// The registry keeps rules in ascending priority; files evaluate them in
    /// descending priority.
    pub fn new(mut sink: S, registry: &Registry) -> Result<Self> {
        let l_snapshot = registry.rules().snapshot();
        let mut l_rules = Vec::with_capacity(l_snapshot.len());
        for rule in l_snapshot.into_iter().rev() {
            let style_id = sink.register_style(&rule.style)?;
            debug!(
                "registered rule style: priority={} tag={} style_id={style_id}",
                rule.priority, rule.tag
            );
            l_rules.push(SpecFileRule {
                priority: rule.priority,
                tag: rule.tag,
                style_id,
            });
        }

        Ok(Self {
            sink,
            registry: registry.clone(),
            l_rules,
        })
    }

    /// Rules of this file, in evaluation order.
    pub fn rules(&self) -> &[SpecFileRule] {
        &self.l_rules
    }

    /// Style handle registered for the first rule tagged `tag`.
    pub fn style_id(&self, tag: &str) -> Option<usize> {
        self.l_rules
            .iter()
            .find(|rule| rule.tag == tag)
            .map(|rule| rule.style_id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl TableFile<XlsxSink> {
    /// New workbook-backed file.
    pub fn xlsx(registry: &Registry) -> Result<Self> {
        Self::new(XlsxSink::new(), registry)
    }

    /// Write the workbook to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.sink.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{C_RULE_TAG_ERROR, C_RULE_TAG_WARN, derive_solid_fill_style};
    use crate::sink::MemorySink;

    #[test]
    fn test_new_registers_rules_in_descending_priority() {
        let registry = Registry::with_defaults();
        registry.register_rule(0, "newface", derive_solid_fill_style("#aaffaa"));

        let file = TableFile::new(MemorySink::new(), &registry).expect("file");
        let l_tags: Vec<&str> = file.rules().iter().map(|rule| rule.tag.as_str()).collect();
        assert_eq!(l_tags, vec![C_RULE_TAG_ERROR, C_RULE_TAG_WARN, "newface"]);
        let l_priorities: Vec<i64> = file.rules().iter().map(|rule| rule.priority).collect();
        assert_eq!(l_priorities, vec![99, 98, 0]);
        assert_eq!(file.style_id(C_RULE_TAG_ERROR), Some(0));
        assert_eq!(file.style_id("newface"), Some(2));
        assert_eq!(file.sink().styles().len(), 3);
        assert_eq!(
            file.sink().style(file.style_id(C_RULE_TAG_ERROR).expect("error")),
            Some(&derive_solid_fill_style("#ffaaaa"))
        );
    }

    #[test]
    fn test_into_sink_returns_registered_styles() {
        let registry = Registry::with_defaults();
        let file = TableFile::new(MemorySink::new(), &registry).expect("file");
        let n_warn = file.style_id(C_RULE_TAG_WARN).expect("warn");

        let sink = file.into_sink();
        assert_eq!(sink.styles().len(), 2);
        assert_eq!(sink.style(n_warn), Some(&derive_solid_fill_style("#ffffaa")));
    }

    #[test]
    fn test_rules_registered_later_do_not_apply() {
        let registry = Registry::new();
        let file = TableFile::new(MemorySink::new(), &registry).expect("file");
        registry.register_rule(1, "late", derive_solid_fill_style("#000000"));

        assert!(file.rules().is_empty());
        assert_eq!(file.style_id("late"), None);
        assert_eq!(file.registry().rules().len(), 1);
    }
}
