mod probe_tests;
mod report_tests;

use crate::staticdom::StaticNode;

/// A fixture page shaped like the target app: two artifact preview buttons
/// in the conversation column, a preview panel with a copy button and an
/// svg-bearing dropdown button, a late `body > div` overlay holding a blob
/// download link, and a radix menu container with one more link.
pub(crate) fn artifact_page() -> StaticNode {
    StaticNode::new("html").child(
        StaticNode::new("body")
            .child(
                StaticNode::new("div").attr("class", "conversation").children([
                    StaticNode::new("button")
                        .attr("aria-label", "Preview contents")
                        .text("artifact one"),
                    StaticNode::new("button")
                        .attr("aria-label", "Preview contents")
                        .text("artifact two"),
                ]),
            )
            .child(
                StaticNode::new("div")
                    .attr("class", "flex basis-0 grow")
                    .child(
                        StaticNode::new("button")
                            .attr("id", "copy-btn")
                            .text("Copy"),
                    )
                    .child(
                        StaticNode::new("button")
                            .attr("id", "radix-42-trigger")
                            .child(StaticNode::new("svg")),
                    )
                    .child(StaticNode::new("button").attr("aria-label", "Close")),
            )
            .child(
                StaticNode::new("div").attr("class", "overlay").child(
                    StaticNode::new("a")
                        .attr("href", "blob:https://app.example/0f93d")
                        .attr("download", "artifact.txt")
                        .text("Download as file"),
                ),
            )
            .child(
                StaticNode::new("div")
                    .attr("id", "radix-42-content")
                    .attr("role", "menu")
                    .child(
                        StaticNode::new("a")
                            .attr("href", "blob:https://app.example/77aa1")
                            .attr("download", "artifact.md")
                            .text("Download as markdown"),
                    ),
            ),
    )
}
