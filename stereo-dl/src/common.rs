pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use futures::{
    future,
    future::FutureExt as _,
    stream::{self, Stream, StreamExt as _, TryStreamExt as _},
};
pub use indexmap::{IndexMap, IndexSet};
pub use itertools::{izip, Itertools as _};
pub use log::{error, info, warn};
pub use noisy_float::prelude::*;
pub use par_stream::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{
    de::{Error as _, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
pub use std::{
    borrow::{Borrow, Cow},
    fmt,
    fmt::Debug,
    iter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    pin::Pin,
    str::FromStr,
    sync::{Arc, Mutex},
};
pub use tch::{Device, IndexOp, Kind, Reduction, Tensor};
pub use tch_tensor_like::TensorLike;

pub type Fallible<T> = Result<T, Error>;
