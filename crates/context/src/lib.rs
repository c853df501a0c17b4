//! Instruction assembly — turns a [`ChatConfig`] into the single system
//! instruction sent with every model call.
//!
//! Assembles, in order: the persona text, the wrapped business context
//! (company, products, promotions, FAQ blocks), an optional
//! calendar-capability sentence, and the closing language directive.
//!
//! # Determinism
//!
//! Assembly is deterministic: identical configurations always produce
//! identical instructions. No random or time-dependent logic is used.

use mostrador_config::{ChatConfig, FaqItem};

const COMPANY_LABEL: &str = "Información de la Empresa";
const PRODUCTS_LABEL: &str = "Productos y Servicios";
const PROMOTIONS_LABEL: &str = "Promociones Actuales";
const FAQ_LABEL: &str = "Preguntas Frecuentes (FAQs)";

const CONTEXT_PREAMBLE: &str = "Usa el siguiente contexto para responder las \
    preguntas del usuario. Si la respuesta no está en el contexto, indica \
    amablemente que no tienes esa información.";

const NO_CONTEXT_FALLBACK: &str =
    "Responde a las preguntas del usuario de la mejor manera posible.";

const CALENDAR_INSTRUCTION: &str = "\nTambién tienes la capacidad de \
    consultar el calendario del usuario para responder a preguntas sobre su \
    agenda utilizando las herramientas disponibles. Informa al usuario que \
    esta es una demostración y los eventos son de ejemplo.";

const LANGUAGE_DIRECTIVE: &str = "Responde en español.";

/// Build the full system instruction for one model call.
pub fn build_instruction(config: &ChatConfig) -> String {
    let mut context = String::new();
    append_labeled_block(&mut context, COMPANY_LABEL, &config.company_info);
    append_labeled_block(&mut context, PRODUCTS_LABEL, &config.products_info);
    append_labeled_block(&mut context, PROMOTIONS_LABEL, &config.promotions_info);
    append_labeled_block(&mut context, FAQ_LABEL, &render_faqs(&config.faqs));

    let final_context = if context.trim().is_empty() {
        NO_CONTEXT_FALLBACK.to_string()
    } else {
        format!(
            "{CONTEXT_PREAMBLE}\n\n--- CONTEXTO DEL NEGOCIO ---\n{}\n--- FIN DEL CONTEXTO ---",
            context.trim()
        )
    };

    let calendar_instruction = if config.google_calendar_integration {
        CALENDAR_INSTRUCTION
    } else {
        ""
    };

    format!(
        "{}\n{final_context}\n{calendar_instruction}\n{LANGUAGE_DIRECTIVE}",
        config.personality
    )
}

fn append_labeled_block(out: &mut String, label: &str, text: &str) {
    if !text.is_empty() {
        out.push_str(label);
        out.push_str(":\n");
        out.push_str(text);
        out.push_str("\n\n");
    }
}

/// Render FAQ entries as `P:`/`R:` pairs joined by blank lines. Entries
/// missing either side are skipped.
fn render_faqs(faqs: &[FaqItem]) -> String {
    faqs.iter()
        .filter(|faq| !faq.question.is_empty() && !faq.answer.is_empty())
        .map(|faq| format!("P: {}\nR: {}", faq.question, faq.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}
