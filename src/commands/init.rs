//! Initialize a new blog directory

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Sample document set written next to the configuration
const SAMPLE_FIXTURE: &str = include_str!("../../fixtures/posts.json");

/// Write a `_config.yml` and a sample fixture into the target directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    let config_content = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''

# Content source
api_endpoint: https://spacetraveling.cdn.prismic.io/api/v2
# access_token: ''
document_type: post
# Serve the bundled sample documents instead of the API.
# Remove this line to read from api_endpoint.
fixture: posts.json
# Seconds before the published ref is looked up again
master_ref_ttl_secs: 5

# Listing
page_size: 2
words_per_minute: 200
max_sessions: 1024

# Date / Time format (date-fns style tokens)
locale: pt_BR
timezone: UTC
summary_date_format: dd MMM yyyy
feed_date_format: dd MMMM yyyy
post_date_format: dd MMM yyyy
"#;

    fs::write(&config_path, config_content)?;
    fs::write(target_dir.join("posts.json"), SAMPLE_FIXTURE)?;

    Ok(())
}
