//! UI resources served through `resources/read`

use std::path::Path;

use serde::Serialize;

use super::error::GatewayError;
use crate::models::Exercise;

/// MIME type the host uses to render app UIs
pub const UI_MIME_TYPE: &str = "text/html;profile=mcp-app";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiResource {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub exercise: Exercise,
    #[serde(skip)]
    pub file_name: &'static str,
}

pub const UI_RESOURCES: [UiResource; 2] = [
    UiResource {
        uri: "ui://calm-tools/breath.html",
        name: "Breathing exercise",
        description: "Guided breathing UI (5-5-5 and 4-7-8 patterns)",
        mime_type: UI_MIME_TYPE,
        exercise: Exercise::Breath,
        file_name: "breath.html",
    },
    UiResource {
        uri: "ui://calm-tools/grounding.html",
        name: "Grounding exercise",
        description: "5-4-3-2-1 grounding UI",
        mime_type: UI_MIME_TYPE,
        exercise: Exercise::Grounding,
        file_name: "grounding.html",
    },
];

pub fn find_resource(uri: &str) -> Option<&'static UiResource> {
    UI_RESOURCES.iter().find(|r| r.uri == uri)
}

/// Resource body: the built UI from `ui_dir`, or a placeholder page
pub fn read_resource(resource: &UiResource, ui_dir: Option<&Path>) -> Result<String, GatewayError> {
    match ui_dir {
        Some(dir) => {
            let path = dir.join(resource.file_name);
            std::fs::read_to_string(&path).map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "Failed to read UI resource");
                GatewayError::Internal(format!("Failed to read {}: {}", resource.uri, e))
            })
        }
        None => Ok(placeholder_page(resource)),
    }
}

fn placeholder_page(resource: &UiResource) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{name}</title></head>\n\
         <body data-exercise=\"{exercise}\">\n<h1>{name}</h1>\n\
         <p>The {exercise} UI has not been built. Set ui_dir in settings.yaml to serve it.</p>\n\
         </body>\n</html>\n",
        name = resource.name,
        exercise = resource.exercise,
    )
}
