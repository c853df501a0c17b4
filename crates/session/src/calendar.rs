//! The calendar lookup function declared to the model when the Google
//! Calendar integration is enabled.

use mostrador_core::ToolDefinition;

/// Name of the calendar lookup function.
pub const CALENDAR_TOOL_NAME: &str = "get_calendar_events";

/// The function declaration for calendar event lookup.
///
/// Declared on every model call while the integration toggle is on; the
/// model decides whether a visitor question actually needs it.
pub fn calendar_tool() -> ToolDefinition {
    ToolDefinition {
        name: CALENDAR_TOOL_NAME.to_string(),
        description: "Obtiene una lista de eventos del calendario del usuario \
            para un rango de fechas específico."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "startDate": {
                    "type": "string",
                    "description": "La fecha de inicio para buscar eventos, en formato ISO 8601 (YYYY-MM-DDTHH:mm:ssZ)."
                },
                "endDate": {
                    "type": "string",
                    "description": "La fecha de finalización para buscar eventos, en formato ISO 8601 (YYYY-MM-DDTHH:mm:ssZ)."
                }
            },
            "required": ["startDate", "endDate"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_names_both_date_parameters() {
        let tool = calendar_tool();
        assert_eq!(tool.name, "get_calendar_events");
        assert_eq!(
            tool.parameters["required"],
            serde_json::json!(["startDate", "endDate"])
        );
        assert_eq!(tool.parameters["properties"]["startDate"]["type"], "string");
        assert_eq!(tool.parameters["properties"]["endDate"]["type"], "string");
    }

    #[test]
    fn description_is_spanish() {
        let tool = calendar_tool();
        assert!(tool.description.contains("eventos del calendario"));
    }
}
