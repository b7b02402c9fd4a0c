//! Bill of materials.

use brickify_pipeline::PieceTable;
use dioxus::prelude::*;

/// Props for the [`PieceTableView`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PieceTableViewProps {
    /// Rows in service order.
    pieces: PieceTable,
}

/// One row per colour followed by a bold total.
#[component]
pub fn PieceTableView(props: PieceTableViewProps) -> Element {
    let total = props.pieces.total_pieces();

    rsx! {
        table { class: "piece-table",
            caption { "Pieces needed to build the image" }
            thead {
                tr {
                    th { "Color" }
                    th { "1 x 1" }
                }
            }
            tbody {
                for entry in props.pieces.entries() {
                    tr { key: "{entry.color_id}",
                        td { "{entry.label}" }
                        td { class: "count", "{entry.count}" }
                    }
                }
                tr { class: "total",
                    td { "Total" }
                    td { class: "count", "{total}" }
                }
            }
        }
    }
}
