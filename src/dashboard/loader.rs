use futures::try_join;
use serde::Serialize;
use tracing::info;

use crate::{
    dashboard::{ client::{ ClientError, GatewayClient }, views::unique_batches },
    models::{ Assignment, Batch, Staff, Subject, SubjectOption },
    session::Role,
};

/// Everything the admin dashboard shows on first paint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminOverview {
    pub batches: Vec<Batch>,
    pub staff: Vec<Staff>,
    pub subjects: Vec<Subject>,
    pub assignments: Vec<Assignment>,
}

/// Fetch the four admin collections at once. One failure fails the load;
/// partial results are discarded.
pub async fn load_admin_overview(client: &GatewayClient) -> Result<AdminOverview, ClientError> {
    let (batches, staff, subjects, assignments) = try_join!(
        client.batches(),
        client.staff(),
        client.subjects(),
        client.assignments()
    )?;

    info!(
        batches = batches.len(),
        staff = staff.len(),
        subjects = subjects.len(),
        assignments = assignments.len(),
        "admin overview loaded"
    );

    Ok(AdminOverview { batches, staff, subjects, assignments })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOption {
    pub id: i64,
    pub name: String,
}

impl From<&Batch> for BatchOption {
    fn from(batch: &Batch) -> Self {
        Self { id: batch.id, name: batch.display_name() }
    }
}

/// Dropdown contents for the attendance history page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryFilters {
    pub batches: Vec<BatchOption>,
    /// Empty for staff, whose subjects depend on the batch picked.
    pub subjects: Vec<SubjectOption>,
}

/// Load the history filters from the sources the signed-in role can read.
pub async fn load_history_filters(client: &GatewayClient) -> Result<HistoryFilters, ClientError> {
    let role = client.session().role().ok_or(ClientError::NotLoggedIn)?;

    let filters = match role {
        Role::Admin => {
            let (batches, subjects) = try_join!(client.batches(), client.subjects())?;
            options(&batches, &subjects)
        }
        Role::Hod => {
            let (batches, subjects) = try_join!(client.hod_batches(), client.hod_subjects())?;
            options(&batches, &subjects)
        }
        Role::Staff => {
            let assignments = client.staff_assignments().await?;
            let batches = unique_batches(&assignments)
                .into_iter()
                .filter_map(|a| {
                    let id = a.batch_id?;
                    Some(BatchOption {
                        id,
                        name: a.batch_name.clone().unwrap_or_else(|| format!("Batch {}", id)),
                    })
                })
                .collect();
            HistoryFilters { batches, subjects: Vec::new() }
        }
    };

    Ok(filters)
}

fn options(batches: &[Batch], subjects: &[Subject]) -> HistoryFilters {
    HistoryFilters {
        batches: batches.iter().map(BatchOption::from).collect(),
        subjects: subjects.iter().map(Subject::as_option).collect(),
    }
}
