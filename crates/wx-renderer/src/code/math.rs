//! Math blocks and inline math.

use std::collections::HashMap;

use tracing::warn;

use crate::context::{MathRenderer, MathSyntax};

/// Numbers math elements and caches rendered expressions.
#[derive(Debug, Default)]
pub(crate) struct MathBlocks {
    index: usize,
    cache: HashMap<(String, bool, MathSyntax), String>,
}

impl MathBlocks {
    /// Restart element numbering. The cache is kept.
    pub(crate) fn reset(&mut self) {
        self.index = 0;
    }

    /// Render an expression wrapped in its numbered container.
    pub(crate) fn render(
        &mut self,
        expression: &str,
        inline: bool,
        syntax: MathSyntax,
        renderer: &dyn MathRenderer,
    ) -> String {
        self.index += 1;
        let id = format!("math-id-{}", self.index);
        let expression = expression.trim();

        let key = (expression.to_owned(), inline, syntax);
        let svg = if let Some(svg) = self.cache.get(&key) {
            svg.clone()
        } else {
            match renderer.render(expression, inline, syntax) {
                Ok(svg) => {
                    self.cache.insert(key, svg.clone());
                    svg
                }
                Err(err) => {
                    warn!("Math rendering failed for {id}: {err}");
                    format!("渲染失败: {err}")
                }
            }
        };

        if inline {
            format!(r#"<span id="{id}" class="inline-math-svg">{svg}</span>"#)
        } else {
            format!(
                r#"<span id="{id}" class="block-math-svg"><section class="block-math-section">{svg}</section></span>"#
            )
        }
    }
}
