//! dropbox_files CLI - Browse and fetch files from Dropbox.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use dropbox_files::{
    Credentials, DownloadFileOptions, DropboxClient, GetMetadataOptions, GetThumbnailBatchOptions,
    ListFolderOptions, Metadata, ThumbnailFormat, ThumbnailMode, ThumbnailSize,
};

/// CLI tool for browsing and downloading Dropbox files.
#[derive(Parser)]
#[command(name = "dropbox_files")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON credentials file.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Access token (falls back to DROPBOX_ACCESS_TOKEN).
    #[arg(long)]
    access_token: Option<String>,

    /// App key (falls back to DROPBOX_CLIENT_ID).
    #[arg(long)]
    client_id: Option<String>,

    /// App secret (falls back to DROPBOX_CLIENT_SECRET).
    #[arg(long)]
    client_secret: Option<String>,

    /// OAuth redirect URI (falls back to DROPBOX_REDIRECT_URI).
    #[arg(long)]
    redirect_uri: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the OAuth authorization URL.
    AuthUrl {
        /// Opaque value passed back to the redirect URI.
        #[arg(long)]
        state: String,

        /// Ask users to approve the app again.
        #[arg(long)]
        force_reapprove: bool,
    },

    /// Exchange an authorization code for an access token.
    Token {
        /// Code received on the redirect URI.
        code: String,
    },

    /// List a folder.
    List {
        /// Folder path; empty for the root.
        #[arg(default_value = "")]
        path: String,

        /// Include deleted entries.
        #[arg(long)]
        include_deleted: bool,

        /// Page size (1-2000).
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show metadata for a file or folder.
    Metadata {
        /// Path, ID or revision.
        path: String,

        /// Include media info for photos and videos.
        #[arg(long)]
        include_media_info: bool,
    },

    /// Download a file to the local filesystem.
    Download {
        /// Path, ID or revision of the file.
        path: String,

        /// Local destination path (file or directory).
        #[arg(long, short = 't', default_value = ".")]
        to: PathBuf,
    },

    /// Fetch thumbnails for a batch of images (up to 25).
    Thumbnails {
        /// Image paths.
        #[arg(required = true)]
        paths: Vec<String>,

        /// jpeg or png.
        #[arg(long, default_value = "jpeg")]
        format: ThumbnailFormat,

        /// One of w32h32, w64h64, w128h128, w256h256, w480h320, w640h480,
        /// w960h640, w1024h768, w2048h1536.
        #[arg(long, default_value = "w64h64")]
        size: ThumbnailSize,

        /// strict, bestfit or fitone_bestfit.
        #[arg(long, default_value = "strict")]
        mode: ThumbnailMode,

        /// Output directory.
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let from_flags = Credentials {
        client_id: cli.client_id,
        client_secret: cli.client_secret,
        redirect_uri: cli.redirect_uri,
        access_token: cli.access_token,
    };
    let from_file = match &cli.config {
        Some(path) => Credentials::from_file(path)
            .with_context(|| format!("Failed to load credentials from {:?}", path))?,
        None => Credentials::default(),
    };
    let credentials = from_flags.or(from_file).or(Credentials::from_env());

    let client = DropboxClient::new(credentials.into_oauth_client());

    match cli.command {
        Commands::AuthUrl {
            state,
            force_reapprove,
        } => {
            let url = client
                .oauth()
                .authorization_url(&state, force_reapprove)
                .context("Failed to build authorization URL")?;
            println!("{}", url);
        }

        Commands::Token { code } => {
            let response = client
                .exchange_auth_code(&code)
                .await
                .context("Failed to exchange authorization code")?;
            let token = response.body();
            println!("access_token: {}", token.access_token);
            println!("token_type:   {}", token.token_type);
            if let Some(account_id) = &token.account_id {
                println!("account_id:   {}", account_id);
            }
        }

        Commands::List {
            path,
            include_deleted,
            limit,
        } => {
            let options = ListFolderOptions {
                path,
                include_deleted,
                limit,
            };
            let response = client
                .list_folder(&options)
                .await
                .with_context(|| format!("Failed to list folder: {:?}", options.path))?;
            let listing = response.body();

            if listing.entries.is_empty() {
                println!("No entries found.");
            } else {
                println!("{}", Metadata::listing_header());
                println!("{}", "-".repeat(80));
                for entry in &listing.entries {
                    println!("{}", entry);
                }
            }
            if listing.has_more {
                println!("(more entries available, cursor: {})", listing.cursor);
            }
        }

        Commands::Metadata {
            path,
            include_media_info,
        } => {
            let options = GetMetadataOptions::new(&path).include_media_info(include_media_info);
            let response = client
                .get_metadata(&options)
                .await
                .with_context(|| format!("Failed to get metadata for: {}", path))?;
            print_metadata(response.body());
        }

        Commands::Download { path, to } => {
            ensure_destination(&to)?;

            print!("Downloading {}... ", path);
            let response = client
                .download(&DownloadFileOptions::new(&path))
                .await
                .with_context(|| format!("Failed to download file: {}", path))?;

            let final_path = if to.is_dir() {
                to.join(&response.metadata().name)
            } else {
                to
            };
            tokio::fs::write(&final_path, response.data())
                .await
                .with_context(|| format!("Failed to write {:?}", final_path))?;

            println!("OK");
            println!("Saved to: {:?}", final_path);
        }

        Commands::Thumbnails {
            paths,
            format,
            size,
            mode,
            out,
        } => {
            tokio::fs::create_dir_all(&out)
                .await
                .with_context(|| format!("Failed to create directory: {:?}", out))?;

            let options =
                GetThumbnailBatchOptions::from_paths_with(paths.iter().cloned(), format, size, mode);
            let response = client
                .get_thumbnail_batch(&options)
                .await
                .context("Failed to get thumbnails")?;

            for (path, entry) in paths.iter().zip(&response.body().entries) {
                match entry.decode_thumbnail()? {
                    Some(image) => {
                        let name = entry
                            .metadata
                            .as_ref()
                            .map(|m| m.name.as_str())
                            .unwrap_or_else(|| file_name(path));
                        let target = out.join(thumbnail_file_name(name, format));
                        tokio::fs::write(&target, image)
                            .await
                            .with_context(|| format!("Failed to write {:?}", target))?;
                        let (width, height) = size.dimensions();
                        info!(
                            "wrote {}x{} thumbnail for {} to {:?}",
                            width, height, path, target
                        );
                        println!("{}: {:?}", path, target);
                    }
                    None => println!("{}: FAILED", path),
                }
            }
        }
    }

    Ok(())
}

fn print_metadata(metadata: &Metadata) {
    println!("name:         {}", metadata.name());
    println!("id:           {}", metadata.id());
    println!("path_display: {}", metadata.path_display());
    match metadata {
        Metadata::File(file) => {
            println!("type:         file");
            println!("size:         {}", file.size);
            println!("rev:          {}", file.rev);
            println!("modified:     {}", file.server_modified.to_rfc3339());
            if let Some(hash) = &file.content_hash {
                println!("content_hash: {}", hash);
            }
        }
        Metadata::Folder(folder) => {
            println!("type:         folder");
            if let Some(sharing) = &folder.sharing_info {
                println!("read_only:    {}", sharing.read_only);
                if let Some(id) = &sharing.shared_folder_id {
                    println!("shared_id:    {}", id);
                }
            }
        }
    }
}

/// Ensure the directory a download will be written to exists.
fn ensure_destination(to: &Path) -> Result<()> {
    if to.is_dir() || to.to_string_lossy().ends_with('/') {
        std::fs::create_dir_all(to)
            .with_context(|| format!("Failed to create directory: {:?}", to))?;
    } else if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    Ok(())
}

/// Last component of a Dropbox path.
fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("thumbnail")
}

/// Local file name for a thumbnail of `name`: the original extension is
/// replaced by the thumbnail format's.
fn thumbnail_file_name(name: &str, format: ThumbnailFormat) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_else(|| name.into());
    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/Photos/cat.jpg"), "cat.jpg");
        assert_eq!(file_name("cat.jpg"), "cat.jpg");
        assert_eq!(file_name("/Photos/"), "Photos");
        assert_eq!(file_name("/"), "thumbnail");
    }

    #[test]
    fn test_thumbnail_file_name_replaces_extension() {
        assert_eq!(thumbnail_file_name("Cat.jpg", ThumbnailFormat::Jpeg), "Cat.jpg");
        assert_eq!(thumbnail_file_name("Cat.jpg", ThumbnailFormat::Png), "Cat.png");
        assert_eq!(
            thumbnail_file_name("scan.2024.tiff", ThumbnailFormat::Jpeg),
            "scan.2024.jpg"
        );
        assert_eq!(thumbnail_file_name("README", ThumbnailFormat::Png), "README.png");
    }

    #[test]
    fn test_cli_parses_thumbnail_options() {
        let cli = Cli::try_parse_from([
            "dropbox_files",
            "thumbnails",
            "/a.jpg",
            "/b.jpg",
            "--size",
            "w256h256",
            "--mode",
            "fitone_bestfit",
        ])
        .unwrap();
        match cli.command {
            Commands::Thumbnails {
                paths, size, mode, format, ..
            } => {
                assert_eq!(paths, vec!["/a.jpg", "/b.jpg"]);
                assert_eq!(size, ThumbnailSize::W256H256);
                assert_eq!(mode, ThumbnailMode::FitoneBestfit);
                assert_eq!(format, ThumbnailFormat::Jpeg);
            }
            _ => panic!("expected thumbnails command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_size() {
        let result = Cli::try_parse_from(["dropbox_files", "thumbnails", "/a.jpg", "--size", "big"]);
        assert!(result.is_err());
    }
}
