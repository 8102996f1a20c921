use futures::task::LocalSpawn;

use crate::application::scheduler::PollRegistry;
use crate::domain::errors::AppResult;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::render::shutdown_notice;
use crate::domain::repositories::{DomHost, WalletControl};
use crate::log_warn;

/// Container replaced by the shutdown notice; the body is used without it.
pub const CONTENT_CONTAINER: &str = "content";

/// Asks the server to shut down. On acknowledgement every poll task is
/// stopped and the page shows the shutdown notice.
pub async fn shutdown<C, D, S>(
    control: &C,
    dom: &D,
    registry: &PollRegistry<S>,
    base_url: &str,
) -> AppResult<bool>
where
    C: WalletControl,
    D: DomHost,
    S: LocalSpawn,
{
    let acknowledged = control.shutdown().await?;
    if !acknowledged {
        log_warn!(LogComponent::Application("Shutdown"), "Server declined the shutdown request");
        return Ok(false);
    }
    registry.stop_all();
    dom.replace_page(CONTENT_CONTAINER, &shutdown_notice(base_url).to_html());
    get_logger().info(LogComponent::Application("Shutdown"), "Wallet server shut down");
    Ok(true)
}
