use tracing::debug;

use schedule_cell::models::Provider;

use crate::models::{ConsultationType, NursingService};

/// Price shown to the customer and sent with the booking.
///
/// Video consultations use the doctor's card price, in-person visits the
/// appointment price (card price when that is missing), nursing visits the
/// chosen service's price.
pub fn quote_price(
    consultation_type: Option<ConsultationType>,
    provider: Option<&Provider>,
    service: Option<&NursingService>,
) -> Option<f64> {
    let price = match consultation_type {
        Some(ConsultationType::Nursing) => service.and_then(|s| s.price),
        Some(ConsultationType::VideoConsulting) => provider.and_then(|p| p.card_price),
        Some(ConsultationType::InPerson) => {
            provider.and_then(|p| p.appointment_price.or(p.card_price))
        }
        None => provider.and_then(|p| p.card_price),
    };

    debug!("Quoted {:?} for {:?}", price, consultation_type);
    price
}

/// Shortest decimal form: `12`, `12.5`, `7.25`.
pub fn format_amount(price: f64) -> String {
    format!("{}", price)
}
