//! Chain build stages through channels.
//!
//! Each stage receives the items of the previous stage through a
//! [`Receiver`] and sends its results through a [`Sender`]. Stages run one
//! after the other, so every item is an independent value owned by exactly
//! one stage at a time.

use std::sync::mpsc::channel;
pub use std::sync::mpsc::{Receiver, Sender};

/// A pipeline.
///
/// # Example
///
/// ```
/// use ampsite::util::pipeline::Pipeline;
///
/// let (html, other) = Pipeline::from_iter(["index.html", "robots.txt", "about.html"])
///     .fork(|rx, (tx_html, tx_other)| {
///         for path in rx {
///             if path.ends_with(".html") {
///                 tx_html.send(path).unwrap();
///             } else {
///                 tx_other.send(path).unwrap();
///             }
///         }
///     });
///
/// let html: Vec<_> = html.map(str::to_uppercase).into_iter().collect();
/// let other: Vec<_> = other.into_iter().collect();
///
/// assert_eq!(html, ["INDEX.HTML", "ABOUT.HTML"]);
/// assert_eq!(other, ["robots.txt"]);
/// ```
#[derive(Debug)]
pub struct Pipeline<T>(Receiver<T>);

impl<T> Pipeline<T> {
    /// Create a pipeline from a fallible closure.
    ///
    /// # Example
    ///
    /// ```
    /// use ampsite::util::pipeline::Pipeline;
    ///
    /// let result: Vec<&str> = Pipeline::new_try(|tx| {
    ///     tx.send("<p>foo</p>").unwrap();
    ///     Ok::<(), ()>(())
    /// })
    /// .unwrap()
    /// .into_iter()
    /// .collect();
    ///
    /// assert_eq!(result, ["<p>foo</p>"]);
    /// ```
    pub fn new_try<E>(f: impl FnOnce(Sender<T>) -> Result<(), E>) -> Result<Self, E> {
        let (tx, rx) = channel();
        (f)(tx)?;
        Ok(Self(rx))
    }

    /// Call a closure that takes one receiver and one sender.
    pub fn pipe<U>(self, f: impl FnOnce(Receiver<T>, Sender<U>)) -> Pipeline<U> {
        let (tx, rx) = channel();
        (f)(self.0, tx);
        Pipeline(rx)
    }

    /// Call a fallible closure that takes one receiver and one sender.
    ///
    /// The first error stops the pipeline.
    ///
    /// # Example
    ///
    /// ```
    /// use ampsite::util::pipeline::Pipeline;
    ///
    /// let result = Pipeline::from_iter(["a{}", "b{}", "too large"]).pipe_try(|rx, tx| {
    ///     for css in rx {
    ///         if css.len() > 3 {
    ///             return Err(css.len());
    ///         }
    ///         tx.send(css).unwrap();
    ///     }
    ///     Ok(())
    /// });
    ///
    /// assert_eq!(result.unwrap_err(), 9);
    /// ```
    pub fn pipe_try<E, U>(
        self,
        f: impl FnOnce(Receiver<T>, Sender<U>) -> Result<(), E>,
    ) -> Result<Pipeline<U>, E> {
        let (tx, rx) = channel();
        (f)(self.0, tx)?;
        Ok(Pipeline(rx))
    }

    /// Call a closure that splits a pipeline in two.
    pub fn fork<A, B>(
        self,
        f: impl FnOnce(Receiver<T>, (Sender<A>, Sender<B>)),
    ) -> (Pipeline<A>, Pipeline<B>) {
        let (tx_a, rx_a) = channel();
        let (tx_b, rx_b) = channel();
        (f)(self.0, (tx_a, tx_b));
        (Pipeline(rx_a), Pipeline(rx_b))
    }

    /// Call a fallible closure that joins two pipelines into one.
    ///
    /// # Example
    ///
    /// ```
    /// use ampsite::util::pipeline::Pipeline;
    ///
    /// let pages = Pipeline::from_iter(["index.html"]);
    /// let files = Pipeline::from_iter(["logo.svg"]);
    ///
    /// let result: Vec<&str> = Pipeline::merge_try((pages, files), |(rx_pages, rx_files), tx| {
    ///     for path in rx_pages.iter().chain(rx_files.iter()) {
    ///         tx.send(path).unwrap();
    ///     }
    ///     Ok::<(), ()>(())
    /// })
    /// .unwrap()
    /// .into_iter()
    /// .collect();
    ///
    /// assert_eq!(result, ["index.html", "logo.svg"]);
    /// ```
    pub fn merge_try<A, B, E>(
        (a, b): (Pipeline<A>, Pipeline<B>),
        f: impl FnOnce((Receiver<A>, Receiver<B>), Sender<T>) -> Result<(), E>,
    ) -> Result<Self, E> {
        let (tx, rx) = channel();
        (f)((a.0, b.0), tx)?;
        Ok(Self(rx))
    }

    /// Call a closure on each element of the pipeline.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Pipeline<U> {
        self.pipe(|rx, tx| {
            for t in rx {
                tx.send((f)(t)).unwrap();
            }
        })
    }

    /// Call a fallible closure on each element of the pipeline.
    pub fn map_try<E, U>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Pipeline<U>, E> {
        self.pipe_try(|rx, tx| {
            for t in rx {
                tx.send((f)(t)?).unwrap();
            }
            Ok(())
        })
    }
}

impl<T> FromIterator<T> for Pipeline<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let (tx, rx) = channel();
        for t in iter {
            tx.send(t).unwrap();
        }
        Self(rx)
    }
}

impl<T> IntoIterator for Pipeline<T> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.0)
    }
}

/// An iterator over the elements of a [`Pipeline`].
#[derive(Debug)]
pub struct IntoIter<T>(Receiver<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.recv().ok()
    }
}
