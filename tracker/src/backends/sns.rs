use async_trait::async_trait;
use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use log::debug;
use quakecore::notify::Notifier;
use quakecore::prelude::NotifyError;

/// SMS delivery through `aws-sdk-sns` publish.
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(shared: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(shared),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn notify(&self, message: &str, recipient: &str) -> Result<(), NotifyError> {
        match self
            .client
            .publish()
            .message(message)
            .phone_number(recipient)
            .send()
            .await
        {
            Ok(output) => {
                debug!("sns accepted message {:?}", output.message_id());
                Ok(())
            }
            Err(err @ SdkError::ServiceError(_)) => {
                Err(NotifyError::Rejected(DisplayErrorContext(&err).to_string()))
            }
            Err(err) => Err(NotifyError::Unavailable(
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }
}
