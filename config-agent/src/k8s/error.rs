use kube::config::KubeconfigError;

const HTTP_CONFLICT: u16 = 409;

#[derive(thiserror::Error, Debug)]
pub enum K8sError {
    #[error("the kube client returned an error: `{0}`")]
    KubeRs(#[source] Box<kube::Error>),

    #[error("it is not possible to read kubeconfig: `{0}`")]
    UnableToSetupClientKubeconfig(#[from] KubeconfigError),

    #[error("the object was modified concurrently: `{0}`")]
    Conflict(String),

    #[error("the API server rejected the request with status {code}: `{message}`")]
    Rejected { code: u16, message: String },

    #[error("configmap `{0}` not found")]
    ConfigMapNotFound(String),
}

impl From<kube::Error> for K8sError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == HTTP_CONFLICT => {
                K8sError::Conflict(response.message)
            }
            kube::Error::Api(response) => K8sError::Rejected {
                code: response.code,
                message: response.message,
            },
            err => K8sError::KubeRs(Box::new(err)),
        }
    }
}
