//! 派送单 HTML (Tera 模板，`.html` 模板名开启自动转义)

use serde::Serialize;
use shared::models::DispatchBatch;
use shared::util::millis_to_rfc3339;
use shared::{AppError, AppResult};
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "delivery_note.html";
const TEMPLATE: &str = include_str!("../../templates/delivery_note.html");

#[derive(Serialize)]
struct SignatureRow<'a> {
    role: &'a str,
    name: &'a str,
    signed_at: String,
}

fn signature_row<'a>(role: &'a str, name: Option<&'a str>, signed_at: Option<i64>) -> SignatureRow<'a> {
    SignatureRow {
        role,
        name: name.unwrap_or_default(),
        signed_at: signed_at.map(millis_to_rfc3339).unwrap_or_default(),
    }
}

fn template_error(err: tera::Error) -> AppError {
    tracing::error!("Failed to render delivery note: {:?}", err);
    AppError::internal(format!("Failed to render delivery note: {err}"))
}

/// 渲染派送单，`arns` 为批次覆盖的 ARN
pub fn render_delivery_note(
    batch: &DispatchBatch,
    arns: &[String],
    generated_at: i64,
) -> AppResult<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)
        .map_err(template_error)?;

    let mut context = Context::new();
    context.insert("batch_id", &batch.batch_id);
    context.insert("state", &batch.state);
    context.insert("card_count", &batch.card_count);
    context.insert("status", batch.status.as_str());
    context.insert("generated_at", &millis_to_rfc3339(generated_at));
    context.insert("arns", arns);
    context.insert(
        "signatures",
        &[
            signature_row(
                "Operator",
                batch.operator_name.as_deref(),
                batch.operator_signed_at,
            ),
            signature_row(
                "Officer",
                batch.officer_name.as_deref(),
                batch.officer_signed_at,
            ),
        ],
    );

    tera.render(TEMPLATE_NAME, &context).map_err(template_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DispatchStatus;

    fn batch() -> DispatchBatch {
        DispatchBatch {
            id: 1,
            batch_id: "B-<1>".into(),
            state: "Lagos".into(),
            card_count: 2,
            batch_arn: None,
            operator_name: Some("Ada & Co".into()),
            operator_signed_at: Some(0),
            officer_name: None,
            officer_signed_at: None,
            delivery_note_path: None,
            confirmation_note_path: None,
            dispatched_at: None,
            delivered_at: None,
            status: DispatchStatus::Prepared,
            created_by: Some("operator".into()),
            created_at: 0,
        }
    }

    #[test]
    fn test_render_escapes_and_lists_arns() {
        let html = render_delivery_note(&batch(), &["A-1".into(), "A-2".into()], 0).unwrap();
        assert!(html.contains("Delivery Note B-&lt;1&gt;"));
        assert!(!html.contains("B-<1>"));
        assert!(html.contains("Ada &amp; Co"));
        assert!(html.contains("<td>1</td><td>A-1</td>"));
        assert!(html.contains("<td>2</td><td>A-2</td>"));
        assert!(html.contains("1970-01-01T00:00:00Z"));
        assert!(html.contains("<td>Officer</td><td></td><td></td>"));
        assert!(!html.contains("No ARNs pending delivery"));
    }

    #[test]
    fn test_render_without_arns() {
        let html = render_delivery_note(&batch(), &[], 0).unwrap();
        assert!(html.contains("No ARNs pending delivery"));
    }

    #[test]
    fn test_script_in_arn_is_escaped() {
        let html = render_delivery_note(&batch(), &["<script>x</script>".into()], 0).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
