//! Direct-to-storage uploads from the command line.

use std::path::PathBuf;

use green_mango_client::{Client, LocalFile, UploadError};

/// Upload each file in order and print its blob reference, one per line.
/// The references can be passed to create/update calls afterwards.
#[allow(clippy::print_stdout)]
pub async fn upload(client: &Client, paths: &[PathBuf]) -> Result<(), UploadError> {
    for path in paths {
        let file = LocalFile::from_path(path).await?;
        let reference = client.uploads().upload(&file).await?;
        println!("{}\t{}", path.display(), reference);
    }
    Ok(())
}
