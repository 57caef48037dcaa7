use std::time::Duration;

use async_trait::async_trait;

use super::{CaseBody, CaseContext, Failure};

pub(crate) struct Pass;

#[async_trait]
impl CaseBody for Pass {
    async fn run(&self, _ctx: &mut CaseContext) -> Result<(), Failure> {
        Ok(())
    }
}

pub(crate) enum Fail {
    Assertion,
    Fixture,
}

#[async_trait]
impl CaseBody for Fail {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        match self {
            Fail::Assertion => {
                crate::assert_case!(false, "Output does not match");
                Ok(())
            }
            Fail::Fixture => ctx
                .read_file("youshouldnothavethisfileinyourdirectory")
                .map(drop),
        }
    }
}

pub(crate) struct Sleep(pub Duration);

#[async_trait]
impl CaseBody for Sleep {
    async fn run(&self, _ctx: &mut CaseContext) -> Result<(), Failure> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

pub(crate) struct Shell {
    script: String,
    checked: bool,
}

impl Shell {
    pub fn checked(script: &str) -> Self {
        Self {
            script: script.to_owned(),
            checked: true,
        }
    }

    pub fn unchecked(script: &str) -> Self {
        Self {
            script: script.to_owned(),
            checked: false,
        }
    }
}

#[async_trait]
impl CaseBody for Shell {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        let argv = ["/bin/sh", "-c", self.script.as_str()];
        if self.checked {
            ctx.run_checked(&argv).await?;
        } else {
            ctx.run(&argv).await?;
        }
        Ok(())
    }
}
