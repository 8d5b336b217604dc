mod pipeline_test;
mod quota_test;
