// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Topological ordering configuration.

use serde::{Deserialize, Serialize};

/// Options for [`TopologicalIter`](crate::TopologicalIter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingOptions {
    /// Close whatever is left of the previous closure when `has_next` is
    /// called. With this off, callers must `close` vertices themselves; until
    /// they do, their dependents are never yielded.
    pub auto_close: bool,
}

impl Default for OrderingOptions {
    fn default() -> Self {
        Self { auto_close: true }
    }
}

impl OrderingOptions {
    pub fn with_auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_close_by_default() {
        assert!(OrderingOptions::default().auto_close);
        let options: OrderingOptions = serde_json::from_str("{}").unwrap();
        assert!(options.auto_close);
        let options: OrderingOptions = serde_json::from_str(r#"{"auto_close":false}"#).unwrap();
        assert_eq!(options, OrderingOptions::default().with_auto_close(false));
    }
}
