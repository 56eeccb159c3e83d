//! Transaction scope helper.

use crate::error::MigrateResult;
use ms_db::Transaction;

/// Close `tx` according to `result`: commit on `Ok`, roll back on `Err`.
///
/// A failed rollback is logged and the original error is returned.
pub(crate) async fn finish<T>(
    mut tx: Box<dyn Transaction + '_>,
    result: MigrateResult<T>,
) -> MigrateResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                log::warn!("Rollback after error failed: {rollback_err}");
            }
            Err(err)
        }
    }
}
